//! Trade engine implementation

use std::sync::Arc;

use chrono::Utc;
use common::decimal::{precision, Amount, Price};
use common::error::{Error, Result};
use common::model::account::Account;
use common::model::ledger::{EntryKind, LedgerEntry};
use common::model::position::Position;
use common::model::quote::Quote;
use dashmap::DashMap;
use ledger_store::{AccountUpdate, LedgerStore};
use quote_service::QuoteProvider;
use tokio::sync::Mutex;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::order::{CashRequest, OrderRequest};
use crate::policy::EnginePolicy;

/// Outcome of a completed buy or sell
#[derive(Debug, Clone)]
pub struct TradeReceipt {
    /// Account the trade executed against
    pub account_id: Uuid,
    /// Operation kind (Buy or Sell)
    pub kind: EntryKind,
    /// Symbol traded
    pub symbol: String,
    /// Display name from the quote
    pub name: String,
    /// Shares traded
    pub shares: u64,
    /// Per-share price actually charged, at cash scale
    pub unit_price: Price,
    /// Total cash moved, at cash scale
    pub total: Amount,
    /// Cash balance after the trade
    pub cash_after: Amount,
    /// Position share count after the trade
    pub shares_after: u64,
}

/// Trade engine over a ledger store and a quote provider
///
/// Every operation takes an explicit account identity; there is no ambient
/// current-user context. Operations on one account serialize behind a
/// per-account lock held for validate-then-apply; quotes are fetched before
/// taking the lock, and the fetched price is the price charged.
pub struct TradeEngine {
    pub(crate) store: Arc<dyn LedgerStore>,
    pub(crate) quotes: Arc<dyn QuoteProvider>,
    pub(crate) policy: EnginePolicy,
    /// Per-account serialization locks, created lazily
    account_locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl TradeEngine {
    /// Create a new trade engine with the default policy
    pub fn new(store: Arc<dyn LedgerStore>, quotes: Arc<dyn QuoteProvider>) -> Self {
        Self::with_policy(store, quotes, EnginePolicy::default())
    }

    /// Create a new trade engine with a specific policy
    pub fn with_policy(
        store: Arc<dyn LedgerStore>,
        quotes: Arc<dyn QuoteProvider>,
        policy: EnginePolicy,
    ) -> Self {
        Self {
            store,
            quotes,
            policy,
            account_locks: DashMap::new(),
        }
    }

    /// Create a new account with the policy's opening cash balance
    pub async fn create_account(&self) -> Result<Account> {
        info!("Creating new account with opening cash {}", self.policy.opening_cash);
        self.store.create_account(self.policy.opening_cash).await
    }

    /// Get an account by ID
    pub async fn get_account(&self, account_id: Uuid) -> Result<Account> {
        self.store
            .get_account(account_id)
            .await?
            .ok_or_else(|| Error::AccountNotFound(format!("Account not found: {}", account_id)))
    }

    /// Resolve a quote for display
    pub async fn quote(&self, symbol: &str) -> Result<Quote> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(Error::InvalidInput("must provide symbol".to_string()));
        }
        self.resolve_quote(&symbol.to_uppercase()).await
    }

    /// Execute a buy order
    pub async fn buy(&self, account_id: Uuid, order: &OrderRequest) -> Result<TradeReceipt> {
        // Quote lookup may be slow; never under the account lock.
        let quote = self.resolve_quote(order.symbol()).await?;
        let unit_price = precision::round_price(quote.price);
        let total = precision::trade_total(quote.price, order.shares());

        let lock = self.account_lock(account_id);
        let _guard = lock.lock().await;

        let mut attempts = 0;
        loop {
            let account = self.get_account(account_id).await?;

            // Exactly exhausting cash is allowed; any shortfall rejects whole.
            if account.cash - total < Amount::ZERO {
                return Err(Error::InsufficientFunds(format!(
                    "Cannot buy {} x {} for {}: cash is {}",
                    order.shares(),
                    order.symbol(),
                    total,
                    account.cash
                )));
            }

            let position = match self.store.get_position(account_id, order.symbol()).await? {
                Some(mut position) => {
                    position.shares += order.shares();
                    position.name = quote.name.clone();
                    position.last_price = unit_price;
                    position.updated_at = Utc::now();
                    position
                }
                None => Position::new(
                    account_id,
                    order.symbol().to_string(),
                    quote.name.clone(),
                    order.shares(),
                    unit_price,
                ),
            };
            let shares_after = position.shares;

            let entry = LedgerEntry::trade(
                account_id,
                EntryKind::Buy,
                order.symbol().to_string(),
                quote.name.clone(),
                order.shares(),
                unit_price,
                total,
            );

            let update = AccountUpdate {
                account_id,
                expected_version: account.version,
                new_cash: account.cash - total,
                position: Some(position),
                entry: Some(entry),
            };

            match self.store.apply(update).await {
                Ok(()) => {
                    info!(
                        "Buy {} x {} at {} for account {}: total {}",
                        order.shares(),
                        order.symbol(),
                        unit_price,
                        account_id,
                        total
                    );
                    return Ok(TradeReceipt {
                        account_id,
                        kind: EntryKind::Buy,
                        symbol: order.symbol().to_string(),
                        name: quote.name.clone(),
                        shares: order.shares(),
                        unit_price,
                        total,
                        cash_after: account.cash - total,
                        shares_after,
                    });
                }
                Err(Error::StoreConflict(msg)) if attempts < self.policy.conflict_retries => {
                    attempts += 1;
                    debug!("Retrying buy after store conflict ({}/{}): {}", attempts, self.policy.conflict_retries, msg);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Execute a sell order
    pub async fn sell(&self, account_id: Uuid, order: &OrderRequest) -> Result<TradeReceipt> {
        let quote = self.resolve_quote(order.symbol()).await?;
        let unit_price = precision::round_price(quote.price);
        let total = precision::trade_total(quote.price, order.shares());

        let lock = self.account_lock(account_id);
        let _guard = lock.lock().await;

        let mut attempts = 0;
        loop {
            let account = self.get_account(account_id).await?;

            let mut positions = self.store.find_positions(account_id, order.symbol()).await?;
            if positions.is_empty() {
                return Err(Error::NoPosition(format!(
                    "No {} shares held in account {}",
                    order.symbol(),
                    account_id
                )));
            }
            if positions.len() > 1 {
                // The store guarantees uniqueness; more than one row is
                // data corruption, not a rejected order.
                error!(
                    "Found {} position rows for account {} symbol {}",
                    positions.len(),
                    account_id,
                    order.symbol()
                );
                return Err(Error::InvariantViolation(format!(
                    "Duplicate position rows for account {} symbol {}",
                    account_id,
                    order.symbol()
                )));
            }
            let mut position = positions.remove(0);

            if order.shares() > position.shares {
                return Err(Error::InsufficientShares(format!(
                    "Cannot sell {} {} shares: holding {}",
                    order.shares(),
                    order.symbol(),
                    position.shares
                )));
            }

            // The row persists even when this drives the count to zero.
            position.shares -= order.shares();
            position.name = quote.name.clone();
            position.last_price = unit_price;
            position.updated_at = Utc::now();
            let shares_after = position.shares;

            let entry = LedgerEntry::trade(
                account_id,
                EntryKind::Sell,
                order.symbol().to_string(),
                quote.name.clone(),
                order.shares(),
                unit_price,
                total,
            );

            let update = AccountUpdate {
                account_id,
                expected_version: account.version,
                new_cash: account.cash + total,
                position: Some(position),
                entry: Some(entry),
            };

            match self.store.apply(update).await {
                Ok(()) => {
                    info!(
                        "Sell {} x {} at {} for account {}: total {}",
                        order.shares(),
                        order.symbol(),
                        unit_price,
                        account_id,
                        total
                    );
                    return Ok(TradeReceipt {
                        account_id,
                        kind: EntryKind::Sell,
                        symbol: order.symbol().to_string(),
                        name: quote.name.clone(),
                        shares: order.shares(),
                        unit_price,
                        total,
                        cash_after: account.cash + total,
                        shares_after,
                    });
                }
                Err(Error::StoreConflict(msg)) if attempts < self.policy.conflict_retries => {
                    attempts += 1;
                    debug!("Retrying sell after store conflict ({}/{}): {}", attempts, self.policy.conflict_retries, msg);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Deposit cash into an account
    pub async fn deposit(&self, account_id: Uuid, amount: Amount) -> Result<Account> {
        if amount < Amount::ZERO {
            return Err(Error::InvalidInput(format!("deposit amount must not be negative: {}", amount)));
        }
        self.adjust_cash(account_id, &CashRequest::new(amount)).await
    }

    /// Withdraw cash from an account
    pub async fn withdraw(&self, account_id: Uuid, amount: Amount) -> Result<Account> {
        if amount < Amount::ZERO {
            return Err(Error::InvalidInput(format!("withdrawal amount must not be negative: {}", amount)));
        }
        self.adjust_cash(account_id, &CashRequest::new(-amount)).await
    }

    /// Apply a signed cash adjustment
    ///
    /// Positive deposits, negative withdraws. A zero amount is a no-op
    /// success: no mutation, no ledger entry.
    pub async fn adjust_cash(&self, account_id: Uuid, cash: &CashRequest) -> Result<Account> {
        if cash.is_zero() {
            return self.get_account(account_id).await;
        }

        let lock = self.account_lock(account_id);
        let _guard = lock.lock().await;

        let mut attempts = 0;
        loop {
            let account = self.get_account(account_id).await?;
            let new_cash = account.cash + cash.amount();

            if new_cash < Amount::ZERO {
                return Err(Error::InsufficientFunds(format!(
                    "Cannot withdraw {}: cash is {}",
                    -cash.amount(),
                    account.cash
                )));
            }
            if new_cash > self.policy.max_cash {
                return Err(Error::LimitExceeded(format!(
                    "Balance {} would exceed the maximum of {}",
                    new_cash, self.policy.max_cash
                )));
            }

            let entry = if cash.amount() > Amount::ZERO {
                LedgerEntry::deposit(account_id, cash.amount())
            } else {
                LedgerEntry::withdraw(account_id, -cash.amount())
            };

            let update = AccountUpdate {
                account_id,
                expected_version: account.version,
                new_cash,
                position: None,
                entry: Some(entry),
            };

            match self.store.apply(update).await {
                Ok(()) => {
                    info!("Cash adjustment of {} for account {}: new balance {}", cash.amount(), account_id, new_cash);
                    return self.get_account(account_id).await;
                }
                Err(Error::StoreConflict(msg)) if attempts < self.policy.conflict_retries => {
                    attempts += 1;
                    debug!("Retrying cash adjustment after store conflict ({}/{}): {}", attempts, self.policy.conflict_retries, msg);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// The account's ledger entries in timestamp order
    pub async fn history(&self, account_id: Uuid) -> Result<Vec<LedgerEntry>> {
        let _account = self.get_account(account_id).await?;
        self.store.list_entries(account_id).await
    }

    /// Resolve a quote for a trade; a miss or provider failure rejects the order
    async fn resolve_quote(&self, symbol: &str) -> Result<Quote> {
        match self.quotes.quote(symbol).await {
            Ok(Some(quote)) => Ok(quote),
            Ok(None) => Err(Error::SymbolNotFound(format!("Invalid symbol: {}", symbol))),
            Err(e) => {
                debug!("Quote provider failed for {}: {}", symbol, e);
                Err(Error::SymbolNotFound(format!("Quote lookup failed for {}", symbol)))
            }
        }
    }

    /// Lazily created per-account lock
    pub(crate) fn account_lock(&self, account_id: Uuid) -> Arc<Mutex<()>> {
        self.account_locks
            .entry(account_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
