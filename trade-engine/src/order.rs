//! Parse-and-validate boundary for incoming requests
//!
//! Symbols and share counts arrive from the outside world as strings. They
//! are parsed here, once, into already-valid request types; the engine
//! itself never re-parses or re-checks raw input.

use common::decimal::{precision, Amount};
use common::error::{Error, Result};

/// A validated buy or sell request
///
/// Guaranteed non-empty symbol and a share count of at least one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    symbol: String,
    shares: u64,
}

impl OrderRequest {
    /// Validate an already-typed symbol and share count
    pub fn new(symbol: &str, shares: u64) -> Result<Self> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(Error::InvalidInput("must provide symbol".to_string()));
        }
        if shares == 0 {
            return Err(Error::InvalidInput("share count must be at least 1".to_string()));
        }

        Ok(Self {
            symbol: symbol.to_uppercase(),
            shares,
        })
    }

    /// Parse raw string input
    ///
    /// Rejects non-numeric, zero, negative, and fractional share counts.
    pub fn parse(symbol: &str, shares: &str) -> Result<Self> {
        let shares = shares
            .trim()
            .parse::<u64>()
            .map_err(|_| Error::InvalidInput(format!("invalid share count: {}", shares.trim())))?;

        Self::new(symbol, shares)
    }

    /// Normalized symbol
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Share count, at least 1
    pub fn shares(&self) -> u64 {
        self.shares
    }
}

/// A validated signed cash amount
///
/// Positive amounts deposit, negative amounts withdraw. The amount is
/// rounded to cash scale here, so the engine always works at 2 decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CashRequest {
    amount: Amount,
}

impl CashRequest {
    /// Build from an already-typed amount, rounding to cash scale
    pub fn new(amount: Amount) -> Self {
        Self {
            amount: precision::round_cash(amount),
        }
    }

    /// Parse raw string input
    pub fn parse(amount: &str) -> Result<Self> {
        let amount = amount
            .trim()
            .parse::<Amount>()
            .map_err(|_| Error::InvalidInput(format!("invalid amount: {}", amount.trim())))?;

        Ok(Self::new(amount))
    }

    /// Signed amount at cash scale
    pub fn amount(&self) -> Amount {
        self.amount
    }

    /// A zero amount performs no mutation
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::decimal::dec;

    #[test]
    fn order_normalizes_symbol() {
        let order = OrderRequest::parse(" aapl ", "10").unwrap();
        assert_eq!(order.symbol(), "AAPL");
        assert_eq!(order.shares(), 10);
    }

    #[test]
    fn order_rejects_bad_input() {
        assert!(matches!(OrderRequest::parse("", "10"), Err(Error::InvalidInput(_))));
        assert!(matches!(OrderRequest::parse("  ", "10"), Err(Error::InvalidInput(_))));
        assert!(matches!(OrderRequest::parse("AAPL", "0"), Err(Error::InvalidInput(_))));
        assert!(matches!(OrderRequest::parse("AAPL", "-3"), Err(Error::InvalidInput(_))));
        assert!(matches!(OrderRequest::parse("AAPL", "1.5"), Err(Error::InvalidInput(_))));
        assert!(matches!(OrderRequest::parse("AAPL", "ten"), Err(Error::InvalidInput(_))));
        assert!(matches!(OrderRequest::new("AAPL", 0), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn cash_request_rounds_at_the_boundary() {
        assert_eq!(CashRequest::parse("10.005").unwrap().amount(), dec!(10.00));
        assert_eq!(CashRequest::parse("-25.5").unwrap().amount(), dec!(-25.50));
        assert!(CashRequest::parse("0").unwrap().is_zero());
        assert!(matches!(CashRequest::parse("ten"), Err(Error::InvalidInput(_))));
    }
}
