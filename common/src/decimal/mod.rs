//! Decimal type utilities for precise cash and price arithmetic

use rust_decimal::Decimal;
pub use rust_decimal_macros::dec;

/// Per-share price
pub type Price = Decimal;

/// Cash amount (typically Price * shares)
pub type Amount = Decimal;

/// Rounding conventions for ledger arithmetic
///
/// Rounding order is observable in ledger totals: the per-share price is
/// rounded to cash scale first, then multiplied by the share count, and the
/// product rounded again. Callers must not defer rounding to display time.
pub mod precision {
    use super::*;

    /// Cash scale: all balances, prices, and totals carry 2 decimal places
    pub const CASH_SCALE: u32 = 2;

    /// Round a per-share price to cash scale
    pub fn round_price(price: Price) -> Price {
        price.round_dp(CASH_SCALE)
    }

    /// Round a cash amount to cash scale
    pub fn round_cash(amount: Amount) -> Amount {
        amount.round_dp(CASH_SCALE)
    }

    /// Total for a trade: rounded price times share count, rounded again
    pub fn trade_total(unit_price: Price, shares: u64) -> Amount {
        round_cash(round_price(unit_price) * Decimal::from(shares))
    }
}
