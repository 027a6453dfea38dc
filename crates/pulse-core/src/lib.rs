//! Core domain types for the pulse game automation layer.
//!
//! This crate provides fundamental types used throughout the system:
//! - `Cash`, `Quantity`: precision-safe numeric types
//! - `ActionParams`, `ExecutionRecord`: issued-action records
//! - `StateUpdate`, `PlayerState`: normalized game state
//! - `ConfirmationResult`: terminal outcomes of pending actions
//! - `Clock`: time source abstraction

pub mod action;
pub mod clock;
pub mod confirmation;
pub mod decimal;
pub mod error;
pub mod state;

pub use action::{ActionId, ActionKind, ActionParams, ExecutionRecord, ExecutorKind};
pub use clock::{system_clock, Clock, ManualClock, SharedClock, SystemClock};
pub use confirmation::{ConfirmationOutcome, ConfirmationResult, MatchedDelta};
pub use decimal::{Cash, Quantity};
pub use error::{CoreError, Result};
pub use state::{PlayerState, StateUpdate, Wager};
