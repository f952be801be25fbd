//! In-memory ledger store

use async_trait::async_trait;
use chrono::Utc;
use common::decimal::Amount;
use common::error::{Error, Result};
use common::model::account::Account;
use common::model::ledger::LedgerEntry;
use common::model::position::Position;
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use crate::store::{AccountUpdate, LedgerStore};

/// In-memory ledger store backed by concurrent maps
///
/// `apply` holds the account's map guard while writing the position and
/// ledger entry, which serializes updates per account; the version check
/// under that guard makes the whole batch all-or-nothing.
pub struct InMemoryLedgerStore {
    /// Accounts by ID
    accounts: DashMap<Uuid, Account>,
    /// Positions by (account ID, symbol)
    positions: DashMap<(Uuid, String), Position>,
    /// Ledger entries by account ID, in append order
    entries: DashMap<Uuid, Vec<LedgerEntry>>,
}

impl InMemoryLedgerStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
            positions: DashMap::new(),
            entries: DashMap::new(),
        }
    }
}

impl Default for InMemoryLedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn create_account(&self, opening_cash: Amount) -> Result<Account> {
        let account = Account::new(opening_cash);
        debug!("Creating account {} with opening cash {}", account.id, opening_cash);
        self.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn get_account(&self, id: Uuid) -> Result<Option<Account>> {
        Ok(self.accounts.get(&id).map(|a| a.clone()))
    }

    async fn get_position(&self, account_id: Uuid, symbol: &str) -> Result<Option<Position>> {
        Ok(self
            .positions
            .get(&(account_id, symbol.to_string()))
            .map(|p| p.clone()))
    }

    async fn find_positions(&self, account_id: Uuid, symbol: &str) -> Result<Vec<Position>> {
        // The composite key makes duplicates unrepresentable here; the
        // defensive multiplicity check still applies to other stores.
        Ok(self
            .get_position(account_id, symbol)
            .await?
            .into_iter()
            .collect())
    }

    async fn list_open_positions(&self, account_id: Uuid) -> Result<Vec<Position>> {
        let mut positions: Vec<Position> = self
            .positions
            .iter()
            .filter_map(|entry| {
                let ((acc_id, _), position) = entry.pair();
                if *acc_id == account_id && position.is_open() {
                    Some(position.clone())
                } else {
                    None
                }
            })
            .collect();

        positions.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        Ok(positions)
    }

    async fn list_entries(&self, account_id: Uuid) -> Result<Vec<LedgerEntry>> {
        let mut entries = self
            .entries
            .get(&account_id)
            .map(|e| e.clone())
            .unwrap_or_default();

        entries.sort_by_key(|e| e.created_at);
        Ok(entries)
    }

    async fn apply(&self, update: AccountUpdate) -> Result<()> {
        // The guard on the account entry is the per-account write lock.
        let mut account = self
            .accounts
            .get_mut(&update.account_id)
            .ok_or_else(|| Error::AccountNotFound(format!("Account not found: {}", update.account_id)))?;

        if account.version != update.expected_version {
            return Err(Error::StoreConflict(format!(
                "Account {} version {} does not match expected {}",
                update.account_id, account.version, update.expected_version
            )));
        }

        account.cash = update.new_cash;
        account.version += 1;
        account.updated_at = Utc::now();

        if let Some(position) = update.position {
            self.positions
                .insert((position.account_id, position.symbol.clone()), position);
        }

        if let Some(entry) = update.entry {
            self.entries
                .entry(update.account_id)
                .or_default()
                .push(entry);
        }

        Ok(())
    }
}
