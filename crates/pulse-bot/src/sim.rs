//! In-process round simulator for the simulated execution back-end.
//!
//! Consumes dispatched execution records, applies them to a small game
//! ledger, and answers with raw state-update payloads in the game's wire
//! shape. The confirmation pipeline runs unchanged against it, which gives
//! training a zero-latency end-to-end cycle and the binary a self-contained
//! smoke run.
//!
//! Deliberately simple economics: a constant unit price, so opens move cash
//! into position quantity one-for-one and closes move it back. Realistic
//! price dynamics belong to the real game, not this harness.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use pulse_core::{ActionParams, ExecutionRecord};

/// Simulated game ledger.
struct SimLedger {
    cash: Decimal,
    position_qty: Decimal,
    avg_cost: Decimal,
    cumulative_pnl: Decimal,
    wager: Option<(Decimal, u64)>,
    tick: u64,
    game_id: String,
}

impl SimLedger {
    fn new(initial_cash: Decimal, game_id: &str) -> Self {
        Self {
            cash: initial_cash,
            position_qty: Decimal::ZERO,
            avg_cost: Decimal::ZERO,
            cumulative_pnl: Decimal::ZERO,
            wager: None,
            tick: 0,
            game_id: game_id.to_string(),
        }
    }

    fn apply(&mut self, record: &ExecutionRecord) {
        self.tick += 1;
        match &record.params {
            ActionParams::Open { amount } => {
                self.cash -= amount.inner();
                self.position_qty += amount.inner();
                self.avg_cost = Decimal::ONE;
            }
            ActionParams::Close { fraction } => {
                let sold = self.position_qty * *fraction;
                self.position_qty -= sold;
                self.cash += sold;
            }
            ActionParams::SideWager { amount } => {
                self.cash -= amount.inner();
                self.wager = Some((amount.inner(), self.tick));
            }
        }
    }

    fn to_raw(&self) -> String {
        let wager = self.wager.map(|(amount, placed_tick)| {
            json!({ "amount": amount.to_string(), "placedTick": placed_tick })
        });

        json!({
            "cash": self.cash.to_string(),
            "positionQty": self.position_qty.to_string(),
            "avgCost": self.avg_cost.to_string(),
            "cumulativePnl": self.cumulative_pnl.to_string(),
            "wager": wager,
            "tick": self.tick,
            "gameId": self.game_id,
        })
        .to_string()
    }
}

/// Default starting cash for the simulated game.
pub const SIM_INITIAL_CASH: Decimal = dec!(5.0);

/// Spawn the simulated game loop.
///
/// Emits a baseline state update immediately (the matcher diffs consecutive
/// updates, so confirmation needs a prior state), then one update per
/// consumed action. Exits when the action channel closes.
#[must_use]
pub fn spawn_sim_game(
    mut actions: mpsc::UnboundedReceiver<ExecutionRecord>,
    updates: mpsc::UnboundedSender<String>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ledger = SimLedger::new(SIM_INITIAL_CASH, "sim-1");

        // Baseline snapshot before any action.
        let _ = updates.send(ledger.to_raw());

        while let Some(record) = actions.recv().await {
            trace!(action_id = %record.id, kind = %record.kind(), "Sim applying action");
            ledger.apply(&record);
            if updates.send(ledger.to_raw()).is_err() {
                break;
            }
        }

        debug!("Simulated game terminated");
    })
}
