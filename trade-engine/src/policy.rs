//! Engine policy limits

use std::env;

use common::decimal::{dec, Amount};

/// Configurable limits for the trade engine
#[derive(Debug, Clone)]
pub struct EnginePolicy {
    /// Ceiling on the cash balance; deposits that would exceed it are rejected
    pub max_cash: Amount,
    /// Opening cash balance for newly created accounts
    pub opening_cash: Amount,
    /// How many times a conflicted store apply is retried before surfacing
    pub conflict_retries: u32,
}

impl Default for EnginePolicy {
    fn default() -> Self {
        Self {
            max_cash: dec!(100000.00),
            opening_cash: dec!(10000.00),
            conflict_retries: 3,
        }
    }
}

impl EnginePolicy {
    /// Create a policy from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_cash: env::var("MAX_CASH")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_cash),
            opening_cash: env::var("OPENING_CASH")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.opening_cash),
            conflict_retries: env::var("CONFLICT_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.conflict_retries),
        }
    }

    /// Create a policy with custom values
    pub fn new(max_cash: Amount, opening_cash: Amount, conflict_retries: u32) -> Self {
        Self {
            max_cash,
            opening_cash,
            conflict_retries,
        }
    }
}
