//! State tracker error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("No state observed yet")]
    Uninitialized,
}

pub type StateResult<T> = Result<T, StateError>;
