//! Visually animated execution back-end.
//!
//! Used for human-supervised validation runs: presses go through an animated
//! surface and every dispatch is announced at `info!` level so the operator
//! can follow along. Rendering itself lives behind the driver; this executor
//! stays synchronous and non-blocking like the others.

use tracing::info;

use pulse_core::{ActionParams, ExecutionRecord, ExecutorKind, SharedClock};

use crate::error::{ExecutorError, ExecutorResult};
use crate::executor::ActionExecutor;
use crate::surface::DynSurfaceDriver;

/// Executor that drives an animated surface for supervised validation.
pub struct VisualExecutor {
    driver: DynSurfaceDriver,
    clock: SharedClock,
}

impl VisualExecutor {
    /// Create a visual executor over the given animated surface driver.
    #[must_use]
    pub fn new(driver: DynSurfaceDriver, clock: SharedClock) -> Self {
        Self { driver, clock }
    }
}

impl ActionExecutor for VisualExecutor {
    fn kind(&self) -> ExecutorKind {
        ExecutorKind::Visual
    }

    fn execute(&self, params: ActionParams) -> ExecutorResult<ExecutionRecord> {
        params.validate()?;

        if !self.driver.is_ready() {
            return Err(ExecutorError::SurfaceUnavailable);
        }

        let record = ExecutionRecord::new(params, self.clock.now_ms(), ExecutorKind::Visual);
        self.driver.press(&record)?;

        info!(
            action_id = %record.id,
            kind = %record.kind(),
            "Action dispatched to animated surface"
        );

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::MockSurfaceDriver;
    use pulse_core::{Cash, ManualClock};
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    #[test]
    fn test_visual_execute() {
        let driver = Arc::new(MockSurfaceDriver::new());
        let clock = Arc::new(ManualClock::new(500));
        let executor = VisualExecutor::new(driver.clone(), clock);

        let record = executor
            .execute(ActionParams::SideWager {
                amount: Cash::new(dec!(0.01)),
            })
            .unwrap();

        assert_eq!(record.executor, ExecutorKind::Visual);
        assert_eq!(record.issued_at_ms, 500);
        assert_eq!(driver.press_count(), 1);
    }
}
