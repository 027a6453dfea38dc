//! Live execution back-end.
//!
//! Drives the real remote game surface through a `SurfaceDriver`. The press
//! is fire-and-forget; confirmation arrives out-of-band on the state-update
//! stream.

use tracing::debug;

use pulse_core::{ActionParams, ExecutionRecord, ExecutorKind, SharedClock};

use crate::error::{ExecutorError, ExecutorResult};
use crate::executor::ActionExecutor;
use crate::surface::DynSurfaceDriver;

/// Executor that presses buttons on the real remote surface.
pub struct LiveExecutor {
    driver: DynSurfaceDriver,
    clock: SharedClock,
}

impl LiveExecutor {
    /// Create a live executor over the given driver.
    #[must_use]
    pub fn new(driver: DynSurfaceDriver, clock: SharedClock) -> Self {
        Self { driver, clock }
    }
}

impl ActionExecutor for LiveExecutor {
    fn kind(&self) -> ExecutorKind {
        ExecutorKind::Live
    }

    fn execute(&self, params: ActionParams) -> ExecutorResult<ExecutionRecord> {
        params.validate()?;

        if !self.driver.is_ready() {
            return Err(ExecutorError::SurfaceUnavailable);
        }

        // Issuance timestamp is taken at dispatch, after validation.
        let record = ExecutionRecord::new(params, self.clock.now_ms(), ExecutorKind::Live);
        self.driver.press(&record)?;

        debug!(
            action_id = %record.id,
            kind = %record.kind(),
            issued_at_ms = record.issued_at_ms,
            "Dispatched live action"
        );

        Ok(record)
    }
}
