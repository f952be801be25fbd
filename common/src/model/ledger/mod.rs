//! Ledger entry model
//!
//! The append-only audit trail. Entries are immutable once written; nothing
//! in the engine updates or deletes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Amount, Price};

/// Display name recorded on deposit entries
pub const DEPOSIT_NAME: &str = "FUNDS ADDED";

/// Display name recorded on withdrawal entries
pub const WITHDRAW_NAME: &str = "FUNDS WITHDRAWN";

/// Kind of operation an entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    Buy,
    Sell,
    Deposit,
    Withdraw,
}

impl EntryKind {
    /// Stable string form used by the persistent store
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Buy => "Buy",
            EntryKind::Sell => "Sell",
            EntryKind::Deposit => "Deposit",
            EntryKind::Withdraw => "Withdraw",
        }
    }

    /// Parse the stable string form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Buy" => Some(EntryKind::Buy),
            "Sell" => Some(EntryKind::Sell),
            "Deposit" => Some(EntryKind::Deposit),
            "Withdraw" => Some(EntryKind::Withdraw),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable audit record of a cash- or security-affecting operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique entry ID
    pub id: Uuid,
    /// Account the entry belongs to
    pub account_id: Uuid,
    /// Operation kind
    pub kind: EntryKind,
    /// Stock symbol; None for cash-only operations
    pub symbol: Option<String>,
    /// Display name of the security, or the cash-operation label
    pub name: String,
    /// Shares traded; None for cash-only operations
    pub shares: Option<u64>,
    /// Per-share price at cash scale; None for cash-only operations
    pub unit_price: Option<Price>,
    /// Total cash moved, always positive, at cash scale
    pub total: Amount,
    /// Timestamp when the operation completed
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Entry for a buy or sell
    pub fn trade(
        account_id: Uuid,
        kind: EntryKind,
        symbol: String,
        name: String,
        shares: u64,
        unit_price: Price,
        total: Amount,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            kind,
            symbol: Some(symbol),
            name,
            shares: Some(shares),
            unit_price: Some(unit_price),
            total,
            created_at: Utc::now(),
        }
    }

    /// Entry for a cash deposit; `amount` must already be positive
    pub fn deposit(account_id: Uuid, amount: Amount) -> Self {
        Self::cash(account_id, EntryKind::Deposit, DEPOSIT_NAME, amount)
    }

    /// Entry for a cash withdrawal; `amount` is the absolute value withdrawn
    pub fn withdraw(account_id: Uuid, amount: Amount) -> Self {
        Self::cash(account_id, EntryKind::Withdraw, WITHDRAW_NAME, amount)
    }

    fn cash(account_id: Uuid, kind: EntryKind, name: &str, amount: Amount) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            kind,
            symbol: None,
            name: name.to_string(),
            shares: None,
            unit_price: None,
            total: amount,
            created_at: Utc::now(),
        }
    }
}
