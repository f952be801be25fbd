//! Quote model

use serde::{Deserialize, Serialize};

use crate::decimal::Price;

/// Externally supplied current price and display name for a symbol
///
/// Price and name come from an untrusted provider; the engine rounds the
/// price at its own boundaries and never assumes a scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Stock symbol
    pub symbol: String,
    /// Display name of the security
    pub name: String,
    /// Current per-share price
    pub price: Price,
}
