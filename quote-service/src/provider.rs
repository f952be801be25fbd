//! Quote provider trait and the in-memory implementation

use async_trait::async_trait;
use common::decimal::Price;
use common::error::Result;
use common::model::quote::Quote;
use dashmap::DashMap;
use tracing::debug;

/// Source of current prices and display names
///
/// The provider may be slow or unavailable. `Ok(None)` means the symbol is
/// unknown; `Err` means the lookup itself failed. Callers decide which of
/// the two maps to a user-facing rejection.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Look up the current quote for a symbol
    async fn quote(&self, symbol: &str) -> Result<Option<Quote>>;
}

/// In-memory quote provider backed by a concurrent map
///
/// Used by the demo binary and tests; a production deployment plugs a real
/// lookup service in behind the same trait.
pub struct StaticQuoteProvider {
    quotes: DashMap<String, Quote>,
}

impl StaticQuoteProvider {
    /// Create an empty provider
    pub fn new() -> Self {
        Self {
            quotes: DashMap::new(),
        }
    }

    /// Set or replace the quote for a symbol
    pub fn set_quote(&self, symbol: &str, name: &str, price: Price) {
        let quote = Quote {
            symbol: symbol.to_string(),
            name: name.to_string(),
            price,
        };
        self.quotes.insert(symbol.to_string(), quote);
    }

    /// Remove a symbol so lookups no longer resolve
    pub fn remove_quote(&self, symbol: &str) {
        self.quotes.remove(symbol);
    }
}

impl Default for StaticQuoteProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteProvider for StaticQuoteProvider {
    async fn quote(&self, symbol: &str) -> Result<Option<Quote>> {
        let quote = self.quotes.get(symbol).map(|q| q.clone());
        debug!("Quote lookup for {}: {}", symbol, if quote.is_some() { "hit" } else { "miss" });
        Ok(quote)
    }
}
