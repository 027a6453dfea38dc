//! Action types and identifiers.
//!
//! An action is a single button-press against the game surface: open a
//! position, close (part of) a position, or place a side wager. Actions are
//! identified by a locally generated `ActionId`; the game's own event stream
//! carries no correlation identifier.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::decimal::Cash;
use crate::error::CoreError;

/// Kind of game action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Buy into the current round.
    Open,
    /// Liquidate a fraction of the open position.
    Close,
    /// Place a side wager on the current round.
    SideWager,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Close => write!(f, "close"),
            Self::SideWager => write!(f, "side_wager"),
        }
    }
}

/// Parameters of a game action, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionParams {
    /// Open a position by spending `amount` cash.
    Open {
        /// Cash to spend.
        amount: Cash,
    },
    /// Close `fraction` of the open position (0 < fraction <= 1).
    Close {
        /// Share of the position to liquidate.
        fraction: Decimal,
    },
    /// Place a side wager of `amount` cash.
    SideWager {
        /// Wager amount.
        amount: Cash,
    },
}

impl ActionParams {
    /// The kind of this action.
    #[must_use]
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Open { .. } => ActionKind::Open,
            Self::Close { .. } => ActionKind::Close,
            Self::SideWager { .. } => ActionKind::SideWager,
        }
    }

    /// Validate parameter ranges.
    ///
    /// Executors must validate before stamping the issuance timestamp, so an
    /// invalid action never reaches the game surface.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::Open { amount } | Self::SideWager { amount } => {
                if !amount.is_positive() {
                    return Err(CoreError::InvalidAmount(amount.to_string()));
                }
            }
            Self::Close { fraction } => {
                if !(*fraction > Decimal::ZERO && *fraction <= Decimal::ONE) {
                    return Err(CoreError::InvalidFraction(fraction.to_string()));
                }
            }
        }
        Ok(())
    }
}

/// Which execution back-end dispatched an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutorKind {
    /// Animated surface, human-supervised validation.
    Visual,
    /// Real remote surface.
    Live,
    /// In-process simulated game, zero latency.
    Simulated,
}

impl fmt::Display for ExecutorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Visual => write!(f, "visual"),
            Self::Live => write!(f, "live"),
            Self::Simulated => write!(f, "simulated"),
        }
    }
}

/// Unique action identifier, generated at issuance.
///
/// The game surface never echoes this back; it exists for local bookkeeping
/// (pending table, latency samples, persisted records).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionId(String);

impl ActionId {
    /// Create a new unique action ID.
    ///
    /// Format: `act_{timestamp_ms}_{uuid_short}`
    pub fn new() -> Self {
        let ts = chrono::Utc::now().timestamp_millis();
        let uuid_short = &Uuid::new_v4().to_string()[..8];
        Self(format!("act_{ts}_{uuid_short}"))
    }

    /// Create from an existing string.
    pub fn from_string(s: String) -> Self {
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ActionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ActionId {
    fn from(s: String) -> Self {
        Self::from_string(s)
    }
}

impl AsRef<str> for ActionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Record of a dispatched action.
///
/// Immutable once created; owned by the issuing call until handed to the
/// confirmation monitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    /// Unique action ID.
    pub id: ActionId,
    /// Action parameters.
    pub params: ActionParams,
    /// Timestamp at the moment the effect was dispatched (Unix ms).
    pub issued_at_ms: u64,
    /// Back-end that dispatched the action.
    pub executor: ExecutorKind,
}

impl ExecutionRecord {
    /// Create a new execution record with a fresh ID.
    #[must_use]
    pub fn new(params: ActionParams, issued_at_ms: u64, executor: ExecutorKind) -> Self {
        Self {
            id: ActionId::new(),
            params,
            issued_at_ms,
            executor,
        }
    }

    /// The kind of the recorded action.
    #[must_use]
    pub fn kind(&self) -> ActionKind {
        self.params.kind()
    }
}
