//! Authoritative player-state tracking.
//!
//! Derives `PlayerState` from the game's state-update stream, stamps
//! duration features at position boundaries, and persists confirmed actions
//! with their reward signal.

pub mod error;
pub mod tracker;

pub use error::{StateError, StateResult};
pub use tracker::StateTracker;
