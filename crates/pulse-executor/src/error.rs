//! Executor error types.
//!
//! An executor error means the action was never dispatched. It is raised
//! synchronously to the caller and must never be conflated with a later
//! confirmation timeout.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("Invalid action parameters: {0}")]
    InvalidParams(#[from] pulse_core::CoreError),

    #[error("Game surface unavailable")]
    SurfaceUnavailable,

    #[error("Dispatch failed: {0}")]
    DispatchFailed(String),
}

pub type ExecutorResult<T> = Result<T, ExecutorError>;
