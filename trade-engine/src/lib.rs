//! Trade execution engine for the paper-trading ledger
//!
//! Validates orders against quoted prices, mutates cash and position state
//! atomically through the ledger store, and appends one audit record per
//! completed operation. Also hosts the read-only portfolio valuation.

pub mod engine;
pub mod order;
pub mod policy;
pub mod valuation;

pub use engine::{TradeEngine, TradeReceipt};
pub use order::{CashRequest, OrderRequest};
pub use policy::EnginePolicy;
pub use valuation::{PortfolioValuation, PositionValue};
