//! External durable action log seam.
//!
//! The confirmation path must never block on persistence, so the log trait
//! is fire-and-forget: `write` enqueues and returns. The default
//! implementation fans records into an unbounded channel drained by a
//! background task into the JSON Lines writer.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use pulse_core::{ConfirmationOutcome, ExecutionRecord, PlayerState};

use crate::writer::JsonLinesWriter;

/// One persisted action: the execution record, its terminal outcome, and
/// the player state around it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLogRecord {
    /// The dispatched action.
    pub record: ExecutionRecord,
    /// Terminal confirmation outcome.
    pub outcome: ConfirmationOutcome,
    /// Confirmation timestamp (Unix ms), if matched.
    pub confirmed_at_ms: Option<u64>,
    /// Round-trip latency (ms), if matched.
    pub total_latency_ms: Option<u64>,
    /// Player state before the action took effect.
    pub before: PlayerState,
    /// Player state after the action took effect.
    pub after: PlayerState,
    /// PnL delta across the action; exposed for downstream learning, not
    /// interpreted here.
    pub reward: Option<Decimal>,
}

/// Fire-and-forget sink for confirmed-action records.
pub trait ActionLog: Send + Sync {
    /// Enqueue a record. Must not block the caller.
    fn write(&self, record: ActionLogRecord);
}

/// Arc wrapper for ActionLog trait objects.
pub type DynActionLog = Arc<dyn ActionLog>;

/// Log that discards everything. Used in tests and simulation runs that
/// do not persist.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLog;

impl ActionLog for NullLog {
    fn write(&self, _record: ActionLogRecord) {}
}

/// Log that forwards records over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelLog {
    tx: mpsc::UnboundedSender<ActionLogRecord>,
}

impl ChannelLog {
    /// Create a channel log together with its receiving half.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ActionLogRecord>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ActionLog for ChannelLog {
    fn write(&self, record: ActionLogRecord) {
        if self.tx.send(record).is_err() {
            // Writer task gone; losing records is preferable to blocking
            // the confirmation path.
            warn!("Action log writer is gone; record dropped");
        }
    }
}

/// Spawn the log writer task.
///
/// Returns the fire-and-forget log handle and the writer task's join
/// handle. The task drains the channel into a daily-rotated JSON Lines
/// file under `base_dir` and exits when every log handle is dropped.
#[must_use]
pub fn spawn_log_writer(base_dir: &str) -> (DynActionLog, JoinHandle<()>) {
    let (log, mut rx) = ChannelLog::new();
    let mut writer = JsonLinesWriter::new(base_dir, 64);

    let handle = tokio::spawn(async move {
        while let Some(record) = rx.recv().await {
            if let Err(e) = writer.add_record(record) {
                warn!(?e, "Failed to persist action record");
            }
        }
        if let Err(e) = writer.flush() {
            warn!(?e, "Final action log flush failed");
        }
        debug!("Action log writer terminated");
    });

    (Arc::new(log), handle)
}
