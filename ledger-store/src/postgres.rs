//! PostgreSQL ledger store
//!
//! Expected schema:
//!
//! ```sql
//! CREATE TABLE accounts (
//!     id UUID PRIMARY KEY,
//!     cash TEXT NOT NULL,
//!     version BIGINT NOT NULL DEFAULT 0,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! CREATE TABLE positions (
//!     account_id UUID NOT NULL REFERENCES accounts(id),
//!     symbol TEXT NOT NULL,
//!     name TEXT NOT NULL,
//!     shares BIGINT NOT NULL,
//!     last_price TEXT NOT NULL,
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     PRIMARY KEY (account_id, symbol)
//! );
//! CREATE TABLE ledger_entries (
//!     id UUID PRIMARY KEY,
//!     account_id UUID NOT NULL REFERENCES accounts(id),
//!     kind TEXT NOT NULL,
//!     symbol TEXT,
//!     name TEXT NOT NULL,
//!     shares BIGINT,
//!     unit_price TEXT,
//!     total TEXT NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! Cash and price columns are stored as strings and re-parsed into
//! decimals, so the database never re-scales a value the engine rounded.

use async_trait::async_trait;
use chrono::Utc;
use common::decimal::{Amount, Price};
use common::error::{Error, Result};
use common::model::account::Account;
use common::model::ledger::{EntryKind, LedgerEntry};
use common::model::position::Position;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::LedgerStoreConfig;
use crate::store::{AccountUpdate, LedgerStore};

/// PostgreSQL-backed ledger store
pub struct PostgresLedgerStore {
    /// Database connection pool
    pool: PgPool,
}

impl PostgresLedgerStore {
    /// Create a new PostgreSQL ledger store
    pub async fn new(database_url: Option<String>) -> Result<Self> {
        let database_url = match database_url {
            Some(url) => url,
            None => std::env::var("DATABASE_URL")
                .map_err(|_| Error::ConfigurationError("DATABASE_URL must be set".to_string()))?,
        };

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&database_url)
            .await
            .map_err(Error::Database)?;

        info!("Connected to PostgreSQL database");

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL ledger store with configuration
    pub async fn with_config(config: &LedgerStoreConfig) -> Result<Self> {
        info!("Connecting to PostgreSQL database with pool size: {}", config.db_pool_size);

        let pool = PgPoolOptions::new()
            .max_connections(config.db_pool_size)
            .connect(&config.database_url)
            .await
            .map_err(Error::Database)?;

        info!("Connected to PostgreSQL database");

        Ok(Self { pool })
    }

    fn parse_amount(value: &str, column: &str) -> Result<Amount> {
        value
            .parse::<Amount>()
            .map_err(|e| Error::Internal(format!("Invalid {} format: {}", column, e)))
    }

    fn account_from_row(row: &PgRow) -> Result<Account> {
        let cash_str: String = row.get("cash");
        Ok(Account {
            id: row.get("id"),
            cash: Self::parse_amount(&cash_str, "cash")?,
            version: row.get("version"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }

    fn position_from_row(row: &PgRow) -> Result<Position> {
        let price_str: String = row.get("last_price");
        let shares: i64 = row.get("shares");
        Ok(Position {
            account_id: row.get("account_id"),
            symbol: row.get("symbol"),
            name: row.get("name"),
            shares: shares as u64,
            last_price: Self::parse_amount(&price_str, "last_price")?,
            updated_at: row.get("updated_at"),
        })
    }

    fn entry_from_row(row: &PgRow) -> Result<LedgerEntry> {
        let kind_str: String = row.get("kind");
        let kind = EntryKind::parse(&kind_str)
            .ok_or_else(|| Error::Internal(format!("Unknown ledger entry kind: {}", kind_str)))?;

        let shares: Option<i64> = row.get("shares");
        let unit_price: Option<String> = row.get("unit_price");
        let unit_price: Option<Price> = match unit_price {
            Some(s) => Some(Self::parse_amount(&s, "unit_price")?),
            None => None,
        };
        let total_str: String = row.get("total");

        Ok(LedgerEntry {
            id: row.get("id"),
            account_id: row.get("account_id"),
            kind,
            symbol: row.get("symbol"),
            name: row.get("name"),
            shares: shares.map(|s| s as u64),
            unit_price,
            total: Self::parse_amount(&total_str, "total")?,
            created_at: row.get("created_at"),
        })
    }
}

#[async_trait]
impl LedgerStore for PostgresLedgerStore {
    async fn create_account(&self, opening_cash: Amount) -> Result<Account> {
        let account = Account::new(opening_cash);
        debug!("Creating account {} in database", account.id);

        sqlx::query(
            "INSERT INTO accounts (id, cash, version, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(account.id)
        .bind(account.cash.to_string())
        .bind(account.version)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(account)
    }

    async fn get_account(&self, id: Uuid) -> Result<Option<Account>> {
        debug!("Getting account from database: {}", id);

        let row = sqlx::query(
            "SELECT id, cash, version, created_at, updated_at FROM accounts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::account_from_row).transpose()
    }

    async fn get_position(&self, account_id: Uuid, symbol: &str) -> Result<Option<Position>> {
        debug!("Getting position from database: {} for {}", symbol, account_id);

        let row = sqlx::query(
            "SELECT account_id, symbol, name, shares, last_price, updated_at
             FROM positions
             WHERE account_id = $1 AND symbol = $2",
        )
        .bind(account_id)
        .bind(symbol)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::position_from_row).transpose()
    }

    async fn find_positions(&self, account_id: Uuid, symbol: &str) -> Result<Vec<Position>> {
        let rows = sqlx::query(
            "SELECT account_id, symbol, name, shares, last_price, updated_at
             FROM positions
             WHERE account_id = $1 AND symbol = $2",
        )
        .bind(account_id)
        .bind(symbol)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::position_from_row).collect()
    }

    async fn list_open_positions(&self, account_id: Uuid) -> Result<Vec<Position>> {
        debug!("Listing open positions for account: {}", account_id);

        let rows = sqlx::query(
            "SELECT account_id, symbol, name, shares, last_price, updated_at
             FROM positions
             WHERE account_id = $1 AND shares > 0
             ORDER BY symbol",
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::position_from_row).collect()
    }

    async fn list_entries(&self, account_id: Uuid) -> Result<Vec<LedgerEntry>> {
        debug!("Listing ledger entries for account: {}", account_id);

        let rows = sqlx::query(
            "SELECT id, account_id, kind, symbol, name, shares, unit_price, total, created_at
             FROM ledger_entries
             WHERE account_id = $1
             ORDER BY created_at",
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::entry_from_row).collect()
    }

    async fn apply(&self, update: AccountUpdate) -> Result<()> {
        debug!("Applying update to account {}", update.account_id);

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        // The version predicate is the all-or-nothing gate: zero rows means
        // either a stale read or a missing account, and nothing commits.
        let result = sqlx::query(
            "UPDATE accounts SET cash = $1, version = version + 1, updated_at = $2
             WHERE id = $3 AND version = $4",
        )
        .bind(update.new_cash.to_string())
        .bind(Utc::now())
        .bind(update.account_id)
        .bind(update.expected_version)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await.map_err(Error::Database)?;

            return if self.get_account(update.account_id).await?.is_some() {
                Err(Error::StoreConflict(format!(
                    "Account {} changed since version {}",
                    update.account_id, update.expected_version
                )))
            } else {
                Err(Error::AccountNotFound(format!(
                    "Account not found: {}",
                    update.account_id
                )))
            };
        }

        if let Some(position) = &update.position {
            sqlx::query(
                "INSERT INTO positions (account_id, symbol, name, shares, last_price, updated_at)
                 VALUES ($1, $2, $3, $4, $5, $6)
                 ON CONFLICT (account_id, symbol)
                 DO UPDATE SET name = $3, shares = $4, last_price = $5, updated_at = $6",
            )
            .bind(position.account_id)
            .bind(&position.symbol)
            .bind(&position.name)
            .bind(position.shares as i64)
            .bind(position.last_price.to_string())
            .bind(position.updated_at)
            .execute(&mut *tx)
            .await?;
        }

        if let Some(entry) = &update.entry {
            sqlx::query(
                "INSERT INTO ledger_entries (id, account_id, kind, symbol, name, shares, unit_price, total, created_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            )
            .bind(entry.id)
            .bind(entry.account_id)
            .bind(entry.kind.as_str())
            .bind(entry.symbol.as_deref())
            .bind(&entry.name)
            .bind(entry.shares.map(|s| s as i64))
            .bind(entry.unit_price.map(|p| p.to_string()))
            .bind(entry.total.to_string())
            .bind(entry.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }
}
