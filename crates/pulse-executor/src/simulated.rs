//! Simulated execution back-end.
//!
//! Zero-latency dispatch into an in-process simulated game, used for
//! training. The simulated game consumes dispatched records from a channel
//! and answers with synthesized state updates, so the confirmation pipeline
//! runs unchanged against it.

use tokio::sync::mpsc;
use tracing::trace;

use pulse_core::{ActionParams, ExecutionRecord, ExecutorKind, SharedClock};

use crate::error::{ExecutorError, ExecutorResult};
use crate::executor::ActionExecutor;

/// Sending half of the simulated game's action channel.
pub type SimSink = mpsc::UnboundedSender<ExecutionRecord>;

/// Executor that feeds an in-process simulated game.
pub struct SimulatedExecutor {
    sink: SimSink,
    clock: SharedClock,
}

impl SimulatedExecutor {
    /// Create a simulated executor feeding the given sink.
    #[must_use]
    pub fn new(sink: SimSink, clock: SharedClock) -> Self {
        Self { sink, clock }
    }

    /// Create an executor together with the receiving half of its channel.
    #[must_use]
    pub fn with_channel(clock: SharedClock) -> (Self, mpsc::UnboundedReceiver<ExecutionRecord>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx, clock), rx)
    }
}

impl ActionExecutor for SimulatedExecutor {
    fn kind(&self) -> ExecutorKind {
        ExecutorKind::Simulated
    }

    fn execute(&self, params: ActionParams) -> ExecutorResult<ExecutionRecord> {
        params.validate()?;

        let record = ExecutionRecord::new(params, self.clock.now_ms(), ExecutorKind::Simulated);

        // Unbounded send never blocks; a closed channel means the simulated
        // game is gone, which is the simulated analogue of a dead surface.
        self.sink
            .send(record.clone())
            .map_err(|_| ExecutorError::SurfaceUnavailable)?;

        trace!(action_id = %record.id, kind = %record.kind(), "Dispatched simulated action");

        Ok(record)
    }
}
