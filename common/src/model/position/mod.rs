//! Position model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Price;

/// An account's holding of shares in one symbol
///
/// Unique per (account, symbol). Created on the first buy of a symbol and
/// never deleted: a sell that empties the holding leaves the row at zero
/// shares, and open-position queries filter on `shares > 0` rather than on
/// row existence. `last_price` records the most recent trade price for
/// display only; it is not a weighted average cost basis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    /// Owning account ID
    pub account_id: Uuid,
    /// Stock symbol (e.g. "AAPL")
    pub symbol: String,
    /// Display name captured from the quote
    pub name: String,
    /// Share count, never negative
    pub shares: u64,
    /// Price of the most recent trade against this position
    pub last_price: Price,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Position {
    /// Create a new position from a first buy
    pub fn new(account_id: Uuid, symbol: String, name: String, shares: u64, last_price: Price) -> Self {
        Self {
            account_id,
            symbol,
            name,
            shares,
            last_price,
            updated_at: Utc::now(),
        }
    }

    /// A position is open while it still holds shares
    pub fn is_open(&self) -> bool {
        self.shares > 0
    }
}
