//! Durable action-log seam and JSON Lines persistence.
//!
//! The log's delivery guarantees are an external concern; this crate only
//! provides the fire-and-forget seam (`ActionLog`) and a JSON Lines
//! implementation with daily rotation behind a background writer task.

pub mod error;
pub mod log;
pub mod writer;

pub use error::{PersistenceError, PersistenceResult};
pub use log::{spawn_log_writer, ActionLog, ActionLogRecord, ChannelLog, DynActionLog, NullLog};
pub use writer::JsonLinesWriter;
