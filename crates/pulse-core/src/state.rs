//! Player state and normalized state-update events.
//!
//! `StateUpdate` is the normalized form of an externally pushed event;
//! `PlayerState` is the authoritative record derived from those updates.
//! Balance fields always mirror the latest update; only entry-tick and
//! duration-derived fields are computed locally.

use serde::{Deserialize, Serialize};

use crate::decimal::{Cash, Quantity};

/// Active side wager on the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wager {
    /// Wagered cash amount.
    pub amount: Cash,
    /// Tick at which the wager was placed.
    pub placed_tick: u64,
}

/// Normalized state-update event from the game's push stream.
///
/// Opaque payloads are parsed into this shape by `pulse-feed`; everything
/// downstream consumes only this record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateUpdate {
    /// Available cash balance.
    pub cash: Cash,
    /// Open position quantity (zero when flat).
    pub position_qty: Quantity,
    /// Average cost of the open position.
    pub avg_cost: Cash,
    /// Cumulative profit and loss.
    pub cumulative_pnl: Cash,
    /// Active side wager, if any.
    pub active_wager: Option<Wager>,
    /// Current game tick.
    pub tick: u64,
    /// Game instance identifier; a change signals a new game.
    pub game_id: String,
    /// Local arrival timestamp (Unix ms).
    pub received_at_ms: u64,
}

/// Authoritative player state.
///
/// Replaced wholesale on every accepted `StateUpdate` to avoid inconsistent
/// partial reads; `entry_tick` is the only locally derived field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Available cash balance.
    pub cash: Cash,
    /// Open position quantity (zero when flat).
    pub position_qty: Quantity,
    /// Average cost of the open position.
    pub avg_cost: Cash,
    /// Cumulative profit and loss.
    pub cumulative_pnl: Cash,
    /// Active side wager, if any.
    pub active_wager: Option<Wager>,
    /// Tick at which the current position was opened.
    pub entry_tick: Option<u64>,
    /// Latest observed game tick.
    pub tick: u64,
    /// Current game instance identifier.
    pub game_id: String,
}

impl PlayerState {
    /// Whether a position is currently open.
    #[must_use]
    pub fn has_position(&self) -> bool {
        self.position_qty.is_positive()
    }

    /// Ticks elapsed since the position was opened, 0 when flat.
    #[must_use]
    pub fn time_in_position(&self) -> u64 {
        match self.entry_tick {
            Some(entry) if self.has_position() => self.tick.saturating_sub(entry),
            _ => 0,
        }
    }

    /// Build a state from an update, carrying over a locally derived
    /// entry tick.
    #[must_use]
    pub fn from_update(update: &StateUpdate, entry_tick: Option<u64>) -> Self {
        Self {
            cash: update.cash,
            position_qty: update.position_qty,
            avg_cost: update.avg_cost,
            cumulative_pnl: update.cumulative_pnl,
            active_wager: update.active_wager,
            entry_tick,
            tick: update.tick,
            game_id: update.game_id.clone(),
        }
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            cash: Cash::ZERO,
            position_qty: Quantity::ZERO,
            avg_cost: Cash::ZERO,
            cumulative_pnl: Cash::ZERO,
            active_wager: None,
            entry_tick: None,
            tick: 0,
            game_id: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_update() -> StateUpdate {
        StateUpdate {
            cash: Cash::new(dec!(4.0)),
            position_qty: Quantity::new(dec!(0.01)),
            avg_cost: Cash::new(dec!(100)),
            cumulative_pnl: Cash::new(dec!(-0.5)),
            active_wager: None,
            tick: 120,
            game_id: "game-1".to_string(),
            received_at_ms: 1180,
        }
    }

    #[test]
    fn test_time_in_position() {
        let update = sample_update();
        let mut state = PlayerState::from_update(&update, Some(100));

        assert!(state.has_position());
        assert_eq!(state.time_in_position(), 20);

        state.tick = 100;
        assert_eq!(state.time_in_position(), 0);
    }

    #[test]
    fn test_time_in_position_flat() {
        let mut update = sample_update();
        update.position_qty = Quantity::ZERO;

        let state = PlayerState::from_update(&update, None);
        assert!(!state.has_position());
        assert_eq!(state.time_in_position(), 0);
    }

    #[test]
    fn test_from_update_mirrors_balances() {
        let update = sample_update();
        let state = PlayerState::from_update(&update, None);

        assert_eq!(state.cash, update.cash);
        assert_eq!(state.position_qty, update.position_qty);
        assert_eq!(state.avg_cost, update.avg_cost);
        assert_eq!(state.cumulative_pnl, update.cumulative_pnl);
        assert_eq!(state.game_id, update.game_id);
    }
}
