//! Interface and application error types.

use std::fmt;
use thiserror::Error;

use pulse_executor::ExecutorError;
use pulse_monitor::MonitorError;

/// Why an action call was rejected before dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// A same-kind action is already awaiting confirmation.
    PendingOfSameType,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PendingOfSameType => write!(f, "pending-of-same-type"),
        }
    }
}

/// Errors surfaced by `execute_action`.
///
/// A confirmation timeout is NOT an error: it comes back as ordinary result
/// data (`ActionResult.success == false`), because "no confirmation yet" is
/// an expected outcome of network variance.
#[derive(Debug, Error)]
pub enum ActionError {
    /// Rejected before any side effect occurred.
    #[error("Action rejected: {0}")]
    Rejected(RejectReason),

    /// The dispatch mechanism itself failed; nothing was pressed.
    #[error("Executor failure: {0}")]
    Executor(#[from] ExecutorError),

    /// Monitor-level failure (shutdown race, usage violation).
    #[error(transparent)]
    Monitor(#[from] MonitorError),
}

/// Application-level errors at the binary boundary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] pulse_telemetry::TelemetryError),
}

pub type AppResult<T> = Result<T, AppError>;
