//! Confirmation outcome types.
//!
//! Every pending action resolves to exactly one terminal
//! `ConfirmationResult`; the result is never mutated afterward.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::action::ActionId;
use crate::state::StateUpdate;

/// Terminal outcome of a pending action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationOutcome {
    /// A state-update delta satisfied the matcher.
    Matched,
    /// The deadline passed with no matching delta.
    TimedOut,
    /// Force-resolved on shutdown.
    Cancelled,
}

impl fmt::Display for ConfirmationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Matched => write!(f, "matched"),
            Self::TimedOut => write!(f, "timed_out"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// The state-update pair whose delta confirmed an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedDelta {
    /// Last update observed before the confirming one.
    pub before: StateUpdate,
    /// The confirming update.
    pub after: StateUpdate,
}

/// Result of waiting for an action's confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationResult {
    /// The action this result resolves.
    pub action_id: ActionId,
    /// Terminal outcome.
    pub outcome: ConfirmationOutcome,
    /// When the action was dispatched (Unix ms).
    pub issued_at_ms: u64,
    /// When the confirming update arrived (Unix ms); None unless matched.
    pub confirmed_at_ms: Option<u64>,
    /// Round-trip latency in milliseconds; None unless matched.
    pub total_latency_ms: Option<u64>,
    /// The delta that confirmed the action; None unless matched.
    pub delta: Option<MatchedDelta>,
}

impl ConfirmationResult {
    /// Build a matched result. Latency is `confirmed_at - issued_at`,
    /// saturating at zero.
    #[must_use]
    pub fn matched(
        action_id: ActionId,
        issued_at_ms: u64,
        confirmed_at_ms: u64,
        delta: MatchedDelta,
    ) -> Self {
        Self {
            action_id,
            outcome: ConfirmationOutcome::Matched,
            issued_at_ms,
            confirmed_at_ms: Some(confirmed_at_ms),
            total_latency_ms: Some(confirmed_at_ms.saturating_sub(issued_at_ms)),
            delta: Some(delta),
        }
    }

    /// Build a timed-out result.
    #[must_use]
    pub fn timed_out(action_id: ActionId, issued_at_ms: u64) -> Self {
        Self {
            action_id,
            outcome: ConfirmationOutcome::TimedOut,
            issued_at_ms,
            confirmed_at_ms: None,
            total_latency_ms: None,
            delta: None,
        }
    }

    /// Build a cancelled result.
    #[must_use]
    pub fn cancelled(action_id: ActionId, issued_at_ms: u64) -> Self {
        Self {
            action_id,
            outcome: ConfirmationOutcome::Cancelled,
            issued_at_ms,
            confirmed_at_ms: None,
            total_latency_ms: None,
            delta: None,
        }
    }

    /// Whether the action was confirmed.
    #[must_use]
    pub fn confirmed(&self) -> bool {
        self.outcome == ConfirmationOutcome::Matched
    }
}
