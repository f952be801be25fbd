//! Portfolio valuation
//!
//! Read-only aggregation of open positions against live quotes. The whole
//! valuation fails if any quote is missing; a partial result with stale or
//! zero prices would be worse than no result.

use common::decimal::{precision, Amount, Price};
use common::error::{Error, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::engine::TradeEngine;

/// One open position valued at the current quote
#[derive(Debug, Clone, Serialize)]
pub struct PositionValue {
    /// Stock symbol
    pub symbol: String,
    /// Display name
    pub name: String,
    /// Shares held
    pub shares: u64,
    /// Current per-share price, at cash scale
    pub current_price: Price,
    /// Current market value of the holding, at cash scale
    pub current_value: Amount,
}

/// Valuation of an account's whole portfolio
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioValuation {
    /// Account being valued
    pub account_id: Uuid,
    /// Open positions with current prices
    pub positions: Vec<PositionValue>,
    /// Cash balance
    pub cash: Amount,
    /// Sum of position values plus cash, at cash scale
    pub total_value: Amount,
}

impl TradeEngine {
    /// Value an account's open positions and cash at current quotes
    pub async fn value(&self, account_id: Uuid) -> Result<PortfolioValuation> {
        let account = self.get_account(account_id).await?;
        let open_positions = self.store.list_open_positions(account_id).await?;

        let mut positions = Vec::with_capacity(open_positions.len());
        let mut total_value = Decimal::ZERO;

        for position in open_positions {
            let quote = match self.quotes.quote(&position.symbol).await {
                Ok(Some(quote)) => quote,
                Ok(None) => {
                    return Err(Error::QuoteUnavailable(format!(
                        "No quote for open position {}",
                        position.symbol
                    )))
                }
                Err(e) => {
                    return Err(Error::QuoteUnavailable(format!(
                        "Quote lookup failed for open position {}: {}",
                        position.symbol, e
                    )))
                }
            };

            let current_price = precision::round_price(quote.price);
            let current_value = precision::trade_total(quote.price, position.shares);
            total_value += current_value;

            positions.push(PositionValue {
                symbol: position.symbol,
                name: quote.name,
                shares: position.shares,
                current_price,
                current_value,
            });
        }

        total_value = precision::round_cash(total_value + account.cash);

        Ok(PortfolioValuation {
            account_id,
            positions,
            cash: account.cash,
            total_value,
        })
    }
}
