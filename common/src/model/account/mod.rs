//! Account model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Amount;

/// Account model
///
/// Holds the cash balance for one user. The balance is mutated only through
/// the trade engine and is never negative after a completed operation. The
/// `version` field is an optimistic-concurrency token: every committed
/// mutation bumps it, and a store apply against a stale version fails with
/// a conflict instead of overwriting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique account ID
    pub id: Uuid,
    /// Cash balance, 2 decimal places
    pub cash: Amount,
    /// Optimistic-concurrency version
    pub version: i64,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account with an opening cash balance
    pub fn new(opening_cash: Amount) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            cash: opening_cash,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }
}
