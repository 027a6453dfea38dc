//! The action executor capability trait.
//!
//! Three interchangeable back-ends implement this trait: visual (animated,
//! human-supervised validation), live (real remote surface), and simulated
//! (zero latency, used for training). They are selected at construction time
//! and share no mutable base state; the correlation logic upstream never
//! changes across kinds.

use std::sync::Arc;

use pulse_core::{ActionParams, ExecutionRecord, ExecutorKind};

use crate::error::ExecutorResult;

/// Capability set of an execution back-end.
///
/// `execute` is synchronous and must not block waiting for confirmation:
/// it validates parameters, stamps the issuance timestamp at the moment the
/// effect is dispatched, and returns the record. Whether the action actually
/// took effect arrives later on the state-update stream.
pub trait ActionExecutor: Send + Sync {
    /// The kind of this back-end.
    fn kind(&self) -> ExecutorKind;

    /// Dispatch an action and return its execution record.
    ///
    /// # Errors
    /// Returns `ExecutorError` if validation fails or the dispatch mechanism
    /// itself cannot complete. In that case no effect was triggered and no
    /// confirmation will ever arrive.
    fn execute(&self, params: ActionParams) -> ExecutorResult<ExecutionRecord>;
}

/// Arc wrapper for ActionExecutor trait objects.
pub type DynExecutor = Arc<dyn ActionExecutor>;
