//! Heuristic action-to-delta matching.
//!
//! The game's event stream carries no correlation identifier, so a pending
//! action is confirmed by observing its expected effect between two
//! consecutive state updates:
//!
//! | kind | expected delta |
//! |---|---|
//! | open | position quantity increases, cash decreases |
//! | close | position quantity decreases toward the requested residual, cash increases |
//! | side_wager | active wager appears with approximately the requested amount |
//!
//! Ambiguity between same-kind actions is avoided by policy (at most one
//! pending action per kind), not resolved here.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use pulse_core::{ActionParams, StateUpdate};

/// Relative tolerance on the close residual, as a share of the prior
/// position quantity. Absorbs rounding in the game's own accounting.
const CLOSE_RESIDUAL_TOLERANCE: Decimal = dec!(0.02);

/// Relative tolerance on the observed wager amount.
const WAGER_AMOUNT_TOLERANCE: Decimal = dec!(0.01);

/// Check whether the delta between two consecutive updates satisfies the
/// expected effect of the given action.
///
/// Pure function: no clocks, no shared state. Updates from different game
/// instances never match (their balances are not comparable).
#[must_use]
pub fn matches(params: &ActionParams, before: &StateUpdate, after: &StateUpdate) -> bool {
    if before.game_id != after.game_id {
        return false;
    }

    match params {
        ActionParams::Open { .. } => matches_open(before, after),
        ActionParams::Close { fraction } => matches_close(*fraction, before, after),
        ActionParams::SideWager { amount } => matches_side_wager(amount.inner(), before, after),
    }
}

fn matches_open(before: &StateUpdate, after: &StateUpdate) -> bool {
    after.position_qty > before.position_qty && after.cash < before.cash
}

fn matches_close(fraction: Decimal, before: &StateUpdate, after: &StateUpdate) -> bool {
    if !(after.position_qty < before.position_qty && after.cash > before.cash) {
        return false;
    }

    let expected = before.position_qty.residual_after(fraction);
    let tolerance = before.position_qty.inner() * CLOSE_RESIDUAL_TOLERANCE;
    (after.position_qty.inner() - expected.inner()).abs() <= tolerance
}

fn matches_side_wager(requested: Decimal, before: &StateUpdate, after: &StateUpdate) -> bool {
    if before.active_wager.is_some() {
        return false;
    }

    match after.active_wager {
        Some(wager) => (wager.amount.inner() - requested).abs() <= requested * WAGER_AMOUNT_TOLERANCE,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::{Cash, Quantity, Wager};

    fn update(cash: Decimal, qty: Decimal, tick: u64) -> StateUpdate {
        StateUpdate {
            cash: Cash::new(cash),
            position_qty: Quantity::new(qty),
            avg_cost: Cash::ZERO,
            cumulative_pnl: Cash::ZERO,
            active_wager: None,
            tick,
            game_id: "game-1".to_string(),
            received_at_ms: 0,
        }
    }

    #[test]
    fn test_open_matches_qty_up_cash_down() {
        let before = update(dec!(5.0), dec!(0), 100);
        let after = update(dec!(4.0), dec!(0.01), 101);

        let params = ActionParams::Open {
            amount: Cash::new(dec!(1)),
        };
        assert!(matches(&params, &before, &after));
    }

    #[test]
    fn test_open_rejects_cash_increase() {
        let before = update(dec!(5.0), dec!(0), 100);
        let after = update(dec!(6.0), dec!(0.01), 101);

        let params = ActionParams::Open {
            amount: Cash::new(dec!(1)),
        };
        assert!(!matches(&params, &before, &after));
    }

    #[test]
    fn test_open_rejects_unchanged_position() {
        let before = update(dec!(5.0), dec!(0.01), 100);
        let after = update(dec!(4.0), dec!(0.01), 101);

        let params = ActionParams::Open {
            amount: Cash::new(dec!(1)),
        };
        assert!(!matches(&params, &before, &after));
    }

    #[test]
    fn test_full_close_matches() {
        let before = update(dec!(4.0), dec!(0.01), 100);
        let after = update(dec!(5.2), dec!(0), 101);

        let params = ActionParams::Close { fraction: dec!(1) };
        assert!(matches(&params, &before, &after));
    }

    #[test]
    fn test_half_close_matches_residual() {
        let before = update(dec!(4.0), dec!(0.02), 100);
        let after = update(dec!(4.6), dec!(0.01), 101);

        let params = ActionParams::Close {
            fraction: dec!(0.5),
        };
        assert!(matches(&params, &before, &after));
    }

    #[test]
    fn test_close_rejects_wrong_residual() {
        let before = update(dec!(4.0), dec!(0.02), 100);
        // Position barely moved; not a half close.
        let after = update(dec!(4.6), dec!(0.019), 101);

        let params = ActionParams::Close {
            fraction: dec!(0.5),
        };
        assert!(!matches(&params, &before, &after));
    }

    #[test]
    fn test_close_rejects_cash_decrease() {
        let before = update(dec!(4.0), dec!(0.02), 100);
        let after = update(dec!(3.5), dec!(0.01), 101);

        let params = ActionParams::Close {
            fraction: dec!(0.5),
        };
        assert!(!matches(&params, &before, &after));
    }

    #[test]
    fn test_side_wager_matches_exact_amount() {
        let before = update(dec!(5.0), dec!(0), 200);
        let mut after = update(dec!(4.99), dec!(0), 200);
        after.active_wager = Some(Wager {
            amount: Cash::new(dec!(0.01)),
            placed_tick: 200,
        });

        let params = ActionParams::SideWager {
            amount: Cash::new(dec!(0.01)),
        };
        assert!(matches(&params, &before, &after));
    }

    #[test]
    fn test_side_wager_rejects_wrong_amount() {
        let before = update(dec!(5.0), dec!(0), 200);
        let mut after = update(dec!(4.5), dec!(0), 200);
        after.active_wager = Some(Wager {
            amount: Cash::new(dec!(0.5)),
            placed_tick: 200,
        });

        let params = ActionParams::SideWager {
            amount: Cash::new(dec!(0.01)),
        };
        assert!(!matches(&params, &before, &after));
    }

    #[test]
    fn test_side_wager_rejects_preexisting_wager() {
        let mut before = update(dec!(5.0), dec!(0), 200);
        before.active_wager = Some(Wager {
            amount: Cash::new(dec!(0.01)),
            placed_tick: 190,
        });
        let mut after = before.clone();
        after.received_at_ms = 1;

        let params = ActionParams::SideWager {
            amount: Cash::new(dec!(0.01)),
        };
        assert!(!matches(&params, &before, &after));
    }

    #[test]
    fn test_no_match_across_game_boundary() {
        let before = update(dec!(5.0), dec!(0), 100);
        let mut after = update(dec!(4.0), dec!(0.01), 1);
        after.game_id = "game-2".to_string();

        let params = ActionParams::Open {
            amount: Cash::new(dec!(1)),
        };
        assert!(!matches(&params, &before, &after));
    }
}
