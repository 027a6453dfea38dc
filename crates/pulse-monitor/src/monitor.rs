//! Pending-action table and confirmation lifecycle.
//!
//! Per-slot state machine: `Claimed -> Registered -> Matched | TimedOut |
//! Cancelled` (terminal). A slot is keyed by action kind; at most one
//! pending action per kind may exist, which keeps id-less matching
//! unambiguous.
//!
//! `wait_for_confirmation` is the only suspension point in the system. The
//! stream-consuming task resolves matches synchronously via
//! `on_state_update`; timeouts are resolved by a periodic sweep at the
//! game's tick period rather than one timer per action.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use pulse_core::{
    ActionId, ActionKind, ConfirmationResult, ExecutionRecord, MatchedDelta, SharedClock,
    StateUpdate,
};
use pulse_telemetry::metrics::{ACTIONS_TOTAL, CONFIRMATION_LATENCY_MS, PENDING_ACTIONS};
use pulse_telemetry::LatencyStats;

use crate::error::{MonitorError, MonitorResult};
use crate::matcher;

/// Monitor configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Confirmation deadline per action (ms). Default: 2000.
    pub timeout_ms: u64,
    /// Timeout sweep interval (ms), normally the game's tick period.
    /// Default: 250.
    pub sweep_interval_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 2000,
            sweep_interval_ms: 250,
        }
    }
}

/// A registered action awaiting confirmation.
struct PendingAction {
    record: ExecutionRecord,
    registered_at_ms: u64,
    deadline_ms: u64,
    /// Consumed on resolution (terminal-once).
    tx: Option<oneshot::Sender<ConfirmationResult>>,
}

/// Occupancy of a per-kind slot.
enum Slot {
    /// Reserved before dispatch; holds the one-per-kind limit while the
    /// executor runs so a concurrent same-kind call is rejected before it
    /// can press anything.
    Claimed { claimed_at_ms: u64 },
    /// Dispatched and awaiting confirmation.
    Registered(PendingAction),
}

struct MonitorInner {
    slots: HashMap<ActionKind, Slot>,
    /// Previous accepted update; the matcher works on consecutive pairs.
    last_update: Option<StateUpdate>,
    shut_down: bool,
}

/// Owns the pending-action table, consumes state updates, applies the
/// matcher, manages timeouts, and feeds latency statistics.
pub struct ConfirmationMonitor {
    inner: Mutex<MonitorInner>,
    /// Waiter rendezvous: receiver half plus issuance timestamp, taken
    /// exactly once by `wait_for_confirmation`.
    waiters: DashMap<ActionId, (u64, oneshot::Receiver<ConfirmationResult>)>,
    latency: Arc<LatencyStats>,
    config: MonitorConfig,
    clock: SharedClock,
}

impl ConfirmationMonitor {
    /// Create a monitor.
    #[must_use]
    pub fn new(config: MonitorConfig, latency: Arc<LatencyStats>, clock: SharedClock) -> Self {
        Self {
            inner: Mutex::new(MonitorInner {
                slots: HashMap::new(),
                last_update: None,
                shut_down: false,
            }),
            waiters: DashMap::new(),
            latency,
            config,
            clock,
        }
    }

    /// Atomically reserve the slot for `kind`.
    ///
    /// Returns `false` if a same-kind action is already claimed or
    /// registered, or the monitor is shut down. A successful claim must be
    /// followed by `register` or rolled back with `release_claim`.
    #[must_use]
    pub fn try_claim(&self, kind: ActionKind) -> bool {
        let mut inner = self.inner.lock();
        if inner.shut_down || inner.slots.contains_key(&kind) {
            return false;
        }
        inner.slots.insert(
            kind,
            Slot::Claimed {
                claimed_at_ms: self.clock.now_ms(),
            },
        );
        PENDING_ACTIONS.inc();
        true
    }

    /// Roll back a claim whose dispatch failed.
    ///
    /// Only removes a `Claimed` slot; a registered action is resolved through
    /// match, timeout, or cancellation instead.
    pub fn release_claim(&self, kind: ActionKind) {
        let mut inner = self.inner.lock();
        if matches!(inner.slots.get(&kind), Some(Slot::Claimed { .. })) {
            inner.slots.remove(&kind);
            PENDING_ACTIONS.dec();
        }
    }

    /// Register a dispatched action for confirmation.
    ///
    /// Fails fast with `DuplicatePending` if a same-kind action is already
    /// registered; callers must resolve the in-flight action before issuing
    /// another of the same kind. The deadline is fixed here:
    /// `registered_at + timeout`.
    pub fn register(&self, record: ExecutionRecord) -> MonitorResult<()> {
        let kind = record.kind();
        let mut inner = self.inner.lock();

        if inner.shut_down {
            return Err(MonitorError::ShutDown);
        }

        let had_claim = match inner.slots.get(&kind) {
            Some(Slot::Registered(_)) => return Err(MonitorError::DuplicatePending(kind)),
            Some(Slot::Claimed { .. }) => true,
            None => false,
        };

        let registered_at_ms = self.clock.now_ms();
        let deadline_ms = registered_at_ms + self.config.timeout_ms;
        let (tx, rx) = oneshot::channel();

        self.waiters
            .insert(record.id.clone(), (record.issued_at_ms, rx));

        trace!(
            action_id = %record.id,
            kind = %kind,
            deadline_ms,
            "Registered pending action"
        );

        inner.slots.insert(
            kind,
            Slot::Registered(PendingAction {
                record,
                registered_at_ms,
                deadline_ms,
                tx: Some(tx),
            }),
        );

        if !had_claim {
            PENDING_ACTIONS.inc();
        }

        Ok(())
    }

    /// Await the terminal result for a registered action.
    ///
    /// This is the only suspension point in the system; it never blocks the
    /// task consuming the state-update stream. The result arrives from a
    /// match, the timeout sweep, or shutdown cancellation.
    pub async fn wait_for_confirmation(
        &self,
        action_id: &ActionId,
    ) -> MonitorResult<ConfirmationResult> {
        let (_, (issued_at_ms, rx)) = self
            .waiters
            .remove(action_id)
            .ok_or_else(|| MonitorError::UnknownAction(action_id.clone()))?;

        // A dropped sender means the monitor itself went away; treat as
        // cancellation so no waiter ever hangs.
        Ok(rx
            .await
            .unwrap_or_else(|_| ConfirmationResult::cancelled(action_id.clone(), issued_at_ms)))
    }

    /// Feed one normalized state update through the matcher.
    ///
    /// Synchronous and non-blocking. Returns the results resolved by this
    /// update (at most one per kind).
    pub fn on_state_update(&self, update: &StateUpdate) -> Vec<ConfirmationResult> {
        let mut resolved = Vec::new();

        {
            let mut inner = self.inner.lock();

            let Some(before) = inner.last_update.replace(update.clone()) else {
                // First update is the baseline; nothing to diff against.
                return resolved;
            };

            let matched_kinds: Vec<ActionKind> = inner
                .slots
                .iter()
                .filter_map(|(kind, slot)| match slot {
                    Slot::Registered(pending)
                        if matcher::matches(&pending.record.params, &before, update) =>
                    {
                        Some(*kind)
                    }
                    _ => None,
                })
                .collect();

            for kind in matched_kinds {
                let Some(Slot::Registered(mut pending)) = inner.slots.remove(&kind) else {
                    continue;
                };
                PENDING_ACTIONS.dec();

                let result = ConfirmationResult::matched(
                    pending.record.id.clone(),
                    pending.record.issued_at_ms,
                    update.received_at_ms,
                    MatchedDelta {
                        before: before.clone(),
                        after: update.clone(),
                    },
                );

                if let Some(latency_ms) = result.total_latency_ms {
                    self.latency.record(latency_ms);
                    CONFIRMATION_LATENCY_MS
                        .with_label_values(&[&kind.to_string()])
                        .observe(latency_ms as f64);
                }
                ACTIONS_TOTAL
                    .with_label_values(&[&kind.to_string(), "matched"])
                    .inc();

                debug!(
                    action_id = %result.action_id,
                    kind = %kind,
                    latency_ms = ?result.total_latency_ms,
                    "Action confirmed"
                );

                if let Some(tx) = pending.tx.take() {
                    let _ = tx.send(result.clone());
                }
                resolved.push(result);
            }
        }

        resolved
    }

    /// Resolve expired registrations and clear stale claims.
    ///
    /// Driven by the periodic sweeper; may also be called directly with an
    /// explicit `now_ms` (tests, embedding loops).
    pub fn sweep(&self, now_ms: u64) -> Vec<ConfirmationResult> {
        let mut resolved = Vec::new();
        let mut inner = self.inner.lock();

        let expired: Vec<ActionKind> = inner
            .slots
            .iter()
            .filter_map(|(kind, slot)| match slot {
                Slot::Registered(pending) if now_ms > pending.deadline_ms => Some(*kind),
                Slot::Claimed { claimed_at_ms }
                    if now_ms.saturating_sub(*claimed_at_ms) > self.config.timeout_ms =>
                {
                    Some(*kind)
                }
                _ => None,
            })
            .collect();

        for kind in expired {
            match inner.slots.remove(&kind) {
                Some(Slot::Registered(mut pending)) => {
                    PENDING_ACTIONS.dec();
                    let overdue_ms = now_ms.saturating_sub(pending.registered_at_ms);

                    let result = ConfirmationResult::timed_out(
                        pending.record.id.clone(),
                        pending.record.issued_at_ms,
                    );
                    ACTIONS_TOTAL
                        .with_label_values(&[&kind.to_string(), "timed_out"])
                        .inc();

                    warn!(
                        action_id = %result.action_id,
                        kind = %kind,
                        overdue_ms,
                        "Confirmation timed out"
                    );

                    if let Some(tx) = pending.tx.take() {
                        let _ = tx.send(result.clone());
                    }
                    resolved.push(result);
                }
                Some(Slot::Claimed { .. }) => {
                    // A claim that never registered: the issuing call died
                    // between claim and dispatch.
                    PENDING_ACTIONS.dec();
                    warn!(kind = %kind, "Cleared stale claim");
                }
                None => {}
            }
        }

        resolved
    }

    /// Force-resolve every slot as cancelled and release all waiters.
    pub fn cancel_all(&self) {
        let mut inner = self.inner.lock();
        let kinds: Vec<ActionKind> = inner.slots.keys().copied().collect();

        for kind in kinds {
            match inner.slots.remove(&kind) {
                Some(Slot::Registered(mut pending)) => {
                    PENDING_ACTIONS.dec();
                    let result = ConfirmationResult::cancelled(
                        pending.record.id.clone(),
                        pending.record.issued_at_ms,
                    );
                    ACTIONS_TOTAL
                        .with_label_values(&[&kind.to_string(), "cancelled"])
                        .inc();

                    if let Some(tx) = pending.tx.take() {
                        let _ = tx.send(result);
                    }
                }
                Some(Slot::Claimed { .. }) => {
                    PENDING_ACTIONS.dec();
                }
                None => {}
            }
        }
    }

    /// Shut down: reject new claims/registrations, cancel everything
    /// pending, and stop the sweeper on its next tick.
    pub fn shutdown(&self) {
        {
            let mut inner = self.inner.lock();
            if inner.shut_down {
                return;
            }
            inner.shut_down = true;
        }
        debug!("Confirmation monitor shutting down");
        self.cancel_all();
    }

    /// Whether shutdown has been requested.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.inner.lock().shut_down
    }

    /// Whether a slot (claimed or registered) exists for `kind`.
    #[must_use]
    pub fn has_pending(&self, kind: ActionKind) -> bool {
        self.inner.lock().slots.contains_key(&kind)
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.lock().slots.len()
    }
}

/// Spawn the periodic timeout sweeper for a monitor.
///
/// One background tick per sweep interval, shared by all pending actions.
/// Exits after the monitor shuts down.
#[must_use]
pub fn spawn_sweeper(monitor: Arc<ConfirmationMonitor>) -> JoinHandle<()> {
    let interval_ms = monitor.config.sweep_interval_ms.max(1);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_millis(interval_ms));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            if monitor.is_shut_down() {
                break;
            }
            let now_ms = monitor.clock.now_ms();
            monitor.sweep(now_ms);
        }

        debug!("Timeout sweeper terminated");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::{ActionParams, Cash, ManualClock, Quantity};
    use rust_decimal_macros::dec;

    fn manual_setup(start_ms: u64) -> (Arc<ConfirmationMonitor>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(start_ms));
        let monitor = Arc::new(ConfirmationMonitor::new(
            MonitorConfig::default(),
            Arc::new(LatencyStats::default()),
            clock.clone(),
        ));
        (monitor, clock)
    }

    fn open_record(issued_at_ms: u64) -> ExecutionRecord {
        ExecutionRecord::new(
            ActionParams::Open {
                amount: Cash::new(dec!(1.0)),
            },
            issued_at_ms,
            pulse_core::ExecutorKind::Simulated,
        )
    }

    fn u(cash: rust_decimal::Decimal, qty: rust_decimal::Decimal, received_at_ms: u64) -> StateUpdate {
        StateUpdate {
            cash: Cash::new(cash),
            position_qty: Quantity::new(qty),
            avg_cost: Cash::ZERO,
            cumulative_pnl: Cash::ZERO,
            active_wager: None,
            tick: received_at_ms / 250,
            game_id: "game-1".to_string(),
            received_at_ms,
        }
    }

    #[tokio::test]
    async fn test_match_resolves_waiter_with_latency() {
        let (monitor, _clock) = manual_setup(1000);

        let record = open_record(1000);
        let action_id = record.id.clone();
        monitor.register(record).unwrap();

        // Baseline, then the confirming delta at 1180.
        assert!(monitor.on_state_update(&u(dec!(5.0), dec!(0), 900)).is_empty());
        let resolved = monitor.on_state_update(&u(dec!(4.0), dec!(0.01), 1180));
        assert_eq!(resolved.len(), 1);

        let result = monitor.wait_for_confirmation(&action_id).await.unwrap();
        assert!(result.confirmed());
        assert_eq!(result.total_latency_ms, Some(180));
        assert_eq!(result.confirmed_at_ms, Some(1180));
        assert_eq!(monitor.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_registration_rejected() {
        let (monitor, _clock) = manual_setup(1000);

        monitor.register(open_record(1000)).unwrap();
        let err = monitor.register(open_record(1001)).unwrap_err();
        assert!(matches!(err, MonitorError::DuplicatePending(ActionKind::Open)));
        assert_eq!(monitor.pending_count(), 1);
    }

    #[tokio::test]
    async fn test_claim_blocks_same_kind_and_releases() {
        let (monitor, _clock) = manual_setup(0);

        assert!(monitor.try_claim(ActionKind::Open));
        assert!(!monitor.try_claim(ActionKind::Open));
        // Different kinds are independent.
        assert!(monitor.try_claim(ActionKind::Close));

        monitor.release_claim(ActionKind::Open);
        assert!(monitor.try_claim(ActionKind::Open));
    }

    #[tokio::test]
    async fn test_register_fills_claimed_slot() {
        let (monitor, _clock) = manual_setup(0);

        assert!(monitor.try_claim(ActionKind::Open));
        monitor.register(open_record(10)).unwrap();
        assert_eq!(monitor.pending_count(), 1);
        assert!(monitor.has_pending(ActionKind::Open));
    }

    #[tokio::test]
    async fn test_sweep_times_out_expired_action() {
        let (monitor, clock) = manual_setup(1000);

        let record = open_record(1000);
        let action_id = record.id.clone();
        monitor.register(record).unwrap();

        // Not yet expired at the deadline itself.
        assert!(monitor.sweep(3000).is_empty());

        clock.set(3001);
        let resolved = monitor.sweep(3001);
        assert_eq!(resolved.len(), 1);

        let result = monitor.wait_for_confirmation(&action_id).await.unwrap();
        assert!(!result.confirmed());
        assert_eq!(result.outcome, pulse_core::ConfirmationOutcome::TimedOut);
        assert!(result.total_latency_ms.is_none());
    }

    #[tokio::test]
    async fn test_sweep_clears_stale_claim() {
        let (monitor, _clock) = manual_setup(1000);

        assert!(monitor.try_claim(ActionKind::SideWager));
        assert!(monitor.sweep(3001).is_empty());
        assert!(!monitor.has_pending(ActionKind::SideWager));
    }

    #[tokio::test]
    async fn test_terminal_once_no_second_resolution() {
        let (monitor, _clock) = manual_setup(1000);

        let record = open_record(1000);
        monitor.register(record).unwrap();

        monitor.on_state_update(&u(dec!(5.0), dec!(0), 900));
        let first = monitor.on_state_update(&u(dec!(4.0), dec!(0.01), 1100));
        assert_eq!(first.len(), 1);

        // A second qualifying delta finds no pending slot.
        let second = monitor.on_state_update(&u(dec!(3.0), dec!(0.02), 1200));
        assert!(second.is_empty());

        // Nor does a late sweep.
        assert!(monitor.sweep(10_000).is_empty());
    }

    #[tokio::test]
    async fn test_cancel_all_releases_waiters() {
        let (monitor, _clock) = manual_setup(1000);

        let record = open_record(1000);
        let action_id = record.id.clone();
        monitor.register(record).unwrap();

        monitor.shutdown();

        let result = monitor.wait_for_confirmation(&action_id).await.unwrap();
        assert_eq!(result.outcome, pulse_core::ConfirmationOutcome::Cancelled);
        assert!(!result.confirmed());
        assert_eq!(monitor.pending_count(), 0);

        // Shut-down monitor rejects new work.
        assert!(!monitor.try_claim(ActionKind::Open));
        assert!(matches!(
            monitor.register(open_record(2000)),
            Err(MonitorError::ShutDown)
        ));
    }

    #[tokio::test]
    async fn test_wait_unknown_action() {
        let (monitor, _clock) = manual_setup(0);
        let err = monitor
            .wait_for_confirmation(&ActionId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, MonitorError::UnknownAction(_)));
    }

    #[tokio::test]
    async fn test_first_update_is_baseline_only() {
        let (monitor, _clock) = manual_setup(1000);

        monitor.register(open_record(1000)).unwrap();

        // Even a plausible-looking first update cannot match: there is no
        // prior state to diff against.
        let resolved = monitor.on_state_update(&u(dec!(4.0), dec!(0.01), 1100));
        assert!(resolved.is_empty());
        assert_eq!(monitor.pending_count(), 1);
    }

    #[tokio::test]
    async fn test_latency_stats_fed_on_match() {
        let clock = Arc::new(ManualClock::new(1000));
        let latency = Arc::new(LatencyStats::default());
        let monitor = ConfirmationMonitor::new(MonitorConfig::default(), latency.clone(), clock);

        monitor.register(open_record(1000)).unwrap();
        monitor.on_state_update(&u(dec!(5.0), dec!(0), 900));
        monitor.on_state_update(&u(dec!(4.0), dec!(0.01), 1180));

        let snap = latency.snapshot();
        assert_eq!(snap.sample_count, 1);
        assert_eq!(snap.p50_ms, 180);
    }

    #[tokio::test]
    async fn test_sweeper_task_resolves_timeout() {
        let clock: SharedClock = Arc::new(pulse_core::SystemClock);
        let monitor = Arc::new(ConfirmationMonitor::new(
            MonitorConfig {
                timeout_ms: 50,
                sweep_interval_ms: 10,
            },
            Arc::new(LatencyStats::default()),
            clock.clone(),
        ));

        let record = ExecutionRecord::new(
            ActionParams::Close { fraction: dec!(1) },
            clock.now_ms(),
            pulse_core::ExecutorKind::Simulated,
        );
        let action_id = record.id.clone();
        monitor.register(record).unwrap();

        let sweeper = spawn_sweeper(monitor.clone());

        let result = monitor.wait_for_confirmation(&action_id).await.unwrap();
        assert_eq!(result.outcome, pulse_core::ConfirmationOutcome::TimedOut);

        monitor.shutdown();
        let _ = sweeper.await;
    }
}
