//! Monitor error types.

use pulse_core::{ActionId, ActionKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    /// A same-kind action is already pending. Matching is heuristic and
    /// id-less, so one pending action per kind is a hard limit.
    #[error("Duplicate pending action of kind {0}")]
    DuplicatePending(ActionKind),

    /// No waiter exists for this action id (never registered, or already
    /// awaited).
    #[error("Unknown action: {0}")]
    UnknownAction(ActionId),

    /// The monitor has been shut down.
    #[error("Monitor is shut down")]
    ShutDown,
}

pub type MonitorResult<T> = Result<T, MonitorError>;
