//! Ledger store trait and the atomic update batch

use async_trait::async_trait;
use common::decimal::Amount;
use common::error::Result;
use common::model::account::Account;
use common::model::ledger::LedgerEntry;
use common::model::position::Position;
use uuid::Uuid;

/// One all-or-nothing state transition for a single account
///
/// `expected_version` is the account version the caller validated against.
/// If the stored version has moved on, the apply fails with a conflict and
/// nothing is written, so a caller can never commit a funds check made
/// against a stale balance.
#[derive(Debug, Clone)]
pub struct AccountUpdate {
    /// Account being mutated
    pub account_id: Uuid,
    /// Version the caller read before validating
    pub expected_version: i64,
    /// Cash balance after the operation
    pub new_cash: Amount,
    /// Position row to insert or replace, if the operation touched one
    pub position: Option<Position>,
    /// Ledger entry to append, if the operation recorded one
    pub entry: Option<LedgerEntry>,
}

/// Storage interface for accounts, positions, and the ledger
///
/// Reads are point-in-time snapshots. All writes go through [`apply`];
/// concurrent applies to the same account serialize, and applies to
/// different accounts do not contend.
///
/// [`apply`]: LedgerStore::apply
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Create a new account with an opening cash balance
    async fn create_account(&self, opening_cash: Amount) -> Result<Account>;

    /// Get an account by ID
    async fn get_account(&self, id: Uuid) -> Result<Option<Account>>;

    /// Get the position for an (account, symbol) pair
    async fn get_position(&self, account_id: Uuid, symbol: &str) -> Result<Option<Position>>;

    /// All position rows for an (account, symbol) pair
    ///
    /// The data model guarantees at most one row per pair; callers use this
    /// to detect a corrupted store rather than trust the guarantee blindly.
    async fn find_positions(&self, account_id: Uuid, symbol: &str) -> Result<Vec<Position>>;

    /// Open positions for an account, filtered to shares > 0
    async fn list_open_positions(&self, account_id: Uuid) -> Result<Vec<Position>>;

    /// The account's ledger entries in timestamp order
    async fn list_entries(&self, account_id: Uuid) -> Result<Vec<LedgerEntry>>;

    /// Apply one account update atomically
    ///
    /// Fails with `StoreConflict` when `expected_version` is stale, and
    /// with `AccountNotFound` when the account does not exist; in both
    /// cases no part of the update is applied.
    async fn apply(&self, update: AccountUpdate) -> Result<()>;
}
