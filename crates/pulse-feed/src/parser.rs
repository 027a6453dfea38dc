//! State-update message parsing.
//!
//! Normalizes raw push payloads into typed `StateUpdate` records. The game
//! sends numeric values as strings; anything that fails to parse is reported
//! as `FeedError::Malformed` and dropped by the consumer.

use serde::Deserialize;
use tracing::trace;

use crate::error::{FeedError, FeedResult};
use pulse_core::{Cash, Quantity, StateUpdate, Wager};

/// Raw side-wager payload.
#[derive(Debug, Deserialize)]
pub struct RawWager {
    pub amount: String,
    #[serde(rename = "placedTick")]
    pub placed_tick: u64,
}

/// Raw state-update payload from the push stream.
#[derive(Debug, Deserialize)]
pub struct RawStateUpdate {
    pub cash: String,
    #[serde(rename = "positionQty")]
    pub position_qty: String,
    #[serde(rename = "avgCost")]
    pub avg_cost: String,
    #[serde(rename = "cumulativePnl")]
    pub cumulative_pnl: String,
    #[serde(default)]
    pub wager: Option<RawWager>,
    pub tick: u64,
    #[serde(rename = "gameId")]
    pub game_id: String,
}

/// Parser for raw state-update payloads.
#[derive(Debug, Default)]
pub struct UpdateParser;

impl UpdateParser {
    /// Create a new parser.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Parse a raw payload into a normalized `StateUpdate`.
    ///
    /// `received_at_ms` is the local arrival timestamp; it becomes the
    /// confirmation timestamp when the update matches a pending action.
    pub fn parse(&self, raw: &str, received_at_ms: u64) -> FeedResult<StateUpdate> {
        let raw: RawStateUpdate = serde_json::from_str(raw)?;
        self.normalize(raw, received_at_ms)
    }

    /// Normalize an already-deserialized raw payload.
    pub fn normalize(&self, raw: RawStateUpdate, received_at_ms: u64) -> FeedResult<StateUpdate> {
        if raw.game_id.is_empty() {
            return Err(FeedError::Malformed("empty gameId".to_string()));
        }

        let active_wager = match raw.wager {
            Some(w) => Some(Wager {
                amount: Cash::new(w.amount.parse()?),
                placed_tick: w.placed_tick,
            }),
            None => None,
        };

        let update = StateUpdate {
            cash: Cash::new(raw.cash.parse()?),
            position_qty: Quantity::new(raw.position_qty.parse()?),
            avg_cost: Cash::new(raw.avg_cost.parse()?),
            cumulative_pnl: Cash::new(raw.cumulative_pnl.parse()?),
            active_wager,
            tick: raw.tick,
            game_id: raw.game_id,
            received_at_ms,
        };

        trace!(
            tick = update.tick,
            game_id = %update.game_id,
            "Normalized state update"
        );

        Ok(update)
    }
}
