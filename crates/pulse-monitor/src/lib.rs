//! Confirmation matching and pending-action lifecycle.
//!
//! # Key Components
//!
//! - [`matcher`]: pure heuristic mapping (pending action, state delta) ->
//!   match/no-match
//! - [`ConfirmationMonitor`]: pending table, waiter rendezvous, timeout
//!   sweep, shutdown cancellation
//! - [`spawn_sweeper`]: one periodic background tick shared by all pending
//!   actions

pub mod error;
pub mod matcher;
pub mod monitor;

pub use error::{MonitorError, MonitorResult};
pub use monitor::{spawn_sweeper, ConfirmationMonitor, MonitorConfig};
