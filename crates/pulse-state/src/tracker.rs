//! Authoritative player-state machine.
//!
//! `PlayerState` is derived exclusively from state updates pushed by the
//! game - never inferred from an unconfirmed local echo of an action. The
//! record is replaced wholesale on every accepted update; only the entry
//! tick (and therefore time-in-position) is computed locally:
//!
//! - position opens (zero -> non-zero): stamp `entry_tick`
//! - position closes (non-zero -> zero): clear `entry_tick`
//! - game identifier changes: new game, duration fields reset
//!
//! Confirmed actions are appended to the external log together with the
//! surrounding state, and the PnL delta across the action is exposed as a
//! reward signal for downstream consumers.

use parking_lot::RwLock;
use rust_decimal::Decimal;
use tracing::{debug, trace};

use pulse_core::{ConfirmationResult, ExecutionRecord, PlayerState, StateUpdate};
use pulse_persistence::{ActionLogRecord, DynActionLog};

struct TrackerInner {
    state: PlayerState,
    initialized: bool,
    last_reward: Option<Decimal>,
}

/// Tracks the authoritative player state and persists confirmed actions.
pub struct StateTracker {
    inner: RwLock<TrackerInner>,
    log: DynActionLog,
}

impl StateTracker {
    /// Create a tracker writing confirmed actions to the given log.
    #[must_use]
    pub fn new(log: DynActionLog) -> Self {
        Self {
            inner: RwLock::new(TrackerInner {
                state: PlayerState::default(),
                initialized: false,
                last_reward: None,
            }),
            log,
        }
    }

    /// Apply a normalized state update, replacing the player state
    /// wholesale.
    pub fn apply_update(&self, update: &StateUpdate) {
        let mut inner = self.inner.write();

        let entry_tick = if !inner.initialized || inner.state.game_id != update.game_id {
            // First observation, or a new game: duration-derived state
            // starts over.
            if inner.initialized {
                debug!(
                    old_game = %inner.state.game_id,
                    new_game = %update.game_id,
                    "Game boundary detected"
                );
            }
            update
                .position_qty
                .is_positive()
                .then_some(update.tick)
        } else {
            match (
                inner.state.has_position(),
                update.position_qty.is_positive(),
            ) {
                // Position opened: stamp entry.
                (false, true) => Some(update.tick),
                // Position closed: clear entry.
                (true, false) => None,
                // Unchanged either way.
                (true, true) => inner.state.entry_tick,
                (false, false) => None,
            }
        };

        inner.state = PlayerState::from_update(update, entry_tick);
        inner.initialized = true;

        trace!(
            tick = update.tick,
            cash = %update.cash,
            position_qty = %update.position_qty,
            "Player state replaced"
        );
    }

    /// Record a terminal confirmation result.
    ///
    /// Appends the execution record with its outcome and the surrounding
    /// player state to the external log (fire-and-forget), and returns the
    /// reward: `cumulative_pnl(after) - cumulative_pnl(before)` for matched
    /// results, `None` otherwise.
    pub fn apply_confirmation(
        &self,
        record: &ExecutionRecord,
        result: &ConfirmationResult,
    ) -> Option<Decimal> {
        let (before, after, reward) = match &result.delta {
            Some(delta) => {
                // Entry tick of the before snapshot is not reconstructible
                // from a single update; the after snapshot gets one only if
                // this delta opened the position.
                let opened = delta.before.position_qty.is_zero()
                    && delta.after.position_qty.is_positive();
                let before = PlayerState::from_update(&delta.before, None);
                let after = PlayerState::from_update(
                    &delta.after,
                    opened.then_some(delta.after.tick),
                );
                let reward =
                    after.cumulative_pnl.inner() - before.cumulative_pnl.inner();
                (before, after, Some(reward))
            }
            None => {
                // Unconfirmed: no delta to attribute; snapshot the current
                // state on both sides.
                let current = self.snapshot();
                (current.clone(), current, None)
            }
        };

        self.inner.write().last_reward = reward;

        self.log.write(ActionLogRecord {
            record: record.clone(),
            outcome: result.outcome,
            confirmed_at_ms: result.confirmed_at_ms,
            total_latency_ms: result.total_latency_ms,
            before,
            after,
            reward,
        });

        debug!(
            action_id = %result.action_id,
            outcome = %result.outcome,
            ?reward,
            "Confirmation recorded"
        );

        reward
    }

    /// Read-only copy of the current player state.
    #[must_use]
    pub fn snapshot(&self) -> PlayerState {
        self.inner.read().state.clone()
    }

    /// Ticks the current position has been open, 0 when flat.
    #[must_use]
    pub fn time_in_position(&self) -> u64 {
        self.inner.read().state.time_in_position()
    }

    /// Reward of the most recently recorded confirmation, if any.
    #[must_use]
    pub fn last_reward(&self) -> Option<Decimal> {
        self.inner.read().last_reward
    }

    /// Whether at least one update has been observed.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.inner.read().initialized
    }
}
