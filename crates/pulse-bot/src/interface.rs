//! The action interface: single public entry point of the automation layer.
//!
//! Composes an executor, the confirmation monitor, latency statistics, and
//! the state tracker per call:
//!
//! 1. claim the per-kind slot (reject duplicates before any side effect)
//! 2. dispatch through the executor (failure here is fatal to the call)
//! 3. register the record with the monitor
//! 4. await confirmation - the system's only suspension point
//! 5. hand the terminal result to the state tracker (persists, rewards)
//!
//! A timeout comes back as data, never as an error, and is never retried
//! here: retrying an ambiguous wagering action is a deliberate caller
//! decision. If the action actually succeeded server-side, the next state
//! update passively reconciles the player state.

use std::sync::Arc;

use parking_lot::Mutex;
use rust_decimal::Decimal;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use pulse_core::{system_clock, ActionId, ActionParams, PlayerState, SharedClock};
use pulse_executor::DynExecutor;
use pulse_feed::UpdateParser;
use pulse_monitor::{spawn_sweeper, ConfirmationMonitor, MonitorError};
use pulse_persistence::DynActionLog;
use pulse_state::StateTracker;
use pulse_telemetry::metrics::{MALFORMED_UPDATES_TOTAL, STATE_UPDATES_TOTAL};
use pulse_telemetry::{LatencySnapshot, LatencyStats};

use crate::config::InterfaceConfig;
use crate::error::{ActionError, RejectReason};

/// Outcome of one `execute_action` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResult {
    /// Whether the action was confirmed. The sole source of truth: a
    /// timed-out or failed action is never presented as succeeded.
    pub success: bool,
    /// The issued action's id.
    pub action_id: ActionId,
    /// Round-trip latency (ms); None unless confirmed.
    pub latency_ms: Option<u64>,
    /// Player state snapshot after applying the result.
    pub state: PlayerState,
}

/// Single public entry point composing executor, monitor, and tracker.
pub struct ActionInterface {
    executor: DynExecutor,
    monitor: Arc<ConfirmationMonitor>,
    tracker: Arc<StateTracker>,
    latency: Arc<LatencyStats>,
    parser: UpdateParser,
    clock: SharedClock,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl ActionInterface {
    /// Create an interface with the system clock.
    #[must_use]
    pub fn new(config: &InterfaceConfig, executor: DynExecutor, log: DynActionLog) -> Self {
        Self::with_clock(config, executor, log, system_clock())
    }

    /// Create an interface with an explicit clock (tests use a manual one).
    #[must_use]
    pub fn with_clock(
        config: &InterfaceConfig,
        executor: DynExecutor,
        log: DynActionLog,
        clock: SharedClock,
    ) -> Self {
        let latency = Arc::new(LatencyStats::new(config.latency_window));
        let monitor = Arc::new(ConfirmationMonitor::new(
            config.monitor_config(),
            latency.clone(),
            clock.clone(),
        ));
        let sweeper = spawn_sweeper(monitor.clone());

        info!(
            executor = %executor.kind(),
            timeout_ms = config.timeout_ms,
            latency_window = config.latency_window,
            "Action interface ready"
        );

        Self {
            executor,
            monitor,
            tracker: Arc::new(StateTracker::new(log)),
            latency,
            parser: UpdateParser::new(),
            clock,
            sweeper: Mutex::new(Some(sweeper)),
        }
    }

    /// Issue one action and await its terminal confirmation result.
    pub async fn execute_action(&self, params: ActionParams) -> Result<ActionResult, ActionError> {
        if self.monitor.is_shut_down() {
            return Err(ActionError::Monitor(MonitorError::ShutDown));
        }

        let kind = params.kind();

        // Reject duplicates atomically, before the executor can press
        // anything.
        if !self.monitor.try_claim(kind) {
            debug!(%kind, "Rejected: same-kind action already pending");
            return Err(ActionError::Rejected(RejectReason::PendingOfSameType));
        }

        // Dispatch. A failure here means nothing reached the game surface;
        // roll the claim back and surface it synchronously.
        let record = match self.executor.execute(params) {
            Ok(record) => record,
            Err(e) => {
                self.monitor.release_claim(kind);
                return Err(e.into());
            }
        };

        if let Err(e) = self.monitor.register(record.clone()) {
            self.monitor.release_claim(kind);
            return Err(e.into());
        }

        // The only suspension point: resolved by match, timeout sweep, or
        // shutdown cancellation.
        let result = self.monitor.wait_for_confirmation(&record.id).await?;

        self.tracker.apply_confirmation(&record, &result);

        Ok(ActionResult {
            success: result.confirmed(),
            action_id: record.id,
            latency_ms: result.total_latency_ms,
            state: self.tracker.snapshot(),
        })
    }

    /// Handle one raw state-update payload.
    ///
    /// Synchronous and non-blocking: normalizes the payload, feeds the
    /// monitor (which resolves matching waiters) and then the tracker.
    /// Malformed payloads are logged and dropped; the stream keeps flowing.
    pub fn handle_raw_update(&self, raw: &str) {
        let received_at_ms = self.clock.now_ms();
        match self.parser.parse(raw, received_at_ms) {
            Ok(update) => {
                STATE_UPDATES_TOTAL.inc();
                self.monitor.on_state_update(&update);
                self.tracker.apply_update(&update);
            }
            Err(e) => {
                MALFORMED_UPDATES_TOTAL.inc();
                warn!(error = %e, "Dropped malformed state update");
            }
        }
    }

    /// Spawn the single task that consumes the raw state-update stream.
    pub fn spawn_update_pump(
        self: &Arc<Self>,
        mut rx: mpsc::UnboundedReceiver<String>,
    ) -> JoinHandle<()> {
        let interface = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(raw) = rx.recv().await {
                interface.handle_raw_update(&raw);
            }
            debug!("Update pump terminated");
        })
    }

    /// Rolling latency statistics.
    #[must_use]
    pub fn latency_stats(&self) -> LatencySnapshot {
        self.latency.snapshot()
    }

    /// Read-only copy of the current player state.
    #[must_use]
    pub fn state_snapshot(&self) -> PlayerState {
        self.tracker.snapshot()
    }

    /// Ticks the current position has been open.
    #[must_use]
    pub fn time_in_position(&self) -> u64 {
        self.tracker.time_in_position()
    }

    /// Reward of the most recently recorded confirmation.
    #[must_use]
    pub fn last_reward(&self) -> Option<Decimal> {
        self.tracker.last_reward()
    }

    /// Number of actions currently awaiting confirmation.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.monitor.pending_count()
    }

    /// Shut down: every pending action is force-resolved as cancelled and
    /// all blocked waiters are released before this returns.
    pub fn shutdown(&self) {
        self.monitor.shutdown();
        if let Some(handle) = self.sweeper.lock().take() {
            handle.abort();
        }
        info!("Action interface shut down");
    }
}

impl Drop for ActionInterface {
    fn drop(&mut self) {
        // Waiters must never be left hanging, even on an unclean exit.
        self.monitor.shutdown();
        if let Some(handle) = self.sweeper.lock().take() {
            handle.abort();
        }
    }
}
