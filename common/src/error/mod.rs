//! Error types for the ledger engine
//!
//! One unified error enum covers every crate in the workspace. Validation
//! and business-rule failures are ordinary variants returned to the caller;
//! `InvariantViolation` is the single variant that signals a defect in the
//! store rather than a rejected request.

use std::fmt::Display;
use thiserror::Error;

/// Ledger engine error type
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or out-of-range request input (symbol, share count, amount)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Quote lookup could not resolve the symbol
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// Account cash cannot cover the operation
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    /// Position holds fewer shares than the sell requests
    #[error("Insufficient shares: {0}")]
    InsufficientShares(String),

    /// No position exists for the (account, symbol) pair
    #[error("No position: {0}")]
    NoPosition(String),

    /// Operation would push the cash balance over the configured ceiling
    #[error("Balance limit exceeded: {0}")]
    LimitExceeded(String),

    /// Store-level data inconsistency; a defect signal, not a rejected order
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// A valuation could not obtain a live quote for an open position
    #[error("Quote unavailable: {0}")]
    QuoteUnavailable(String),

    /// Concurrent modification detected by the store; transient
    #[error("Store conflict: {0}")]
    StoreConflict(String),

    /// Error when an account cannot be found
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Decimal conversion error
    #[error("Decimal conversion error: {0}")]
    DecimalError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait to add context to error results
pub trait ErrorExt<T> {
    /// Add context information to an error
    fn with_context<C, F>(self, context_fn: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Display;
}

impl<T> ErrorExt<T> for Result<T> {
    fn with_context<C, F>(self, context_fn: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Display,
    {
        self.map_err(|e| {
            let context = context_fn().to_string();
            match e {
                Error::InvalidInput(msg) => Error::InvalidInput(format!("{}: {}", context, msg)),
                Error::SymbolNotFound(msg) => Error::SymbolNotFound(format!("{}: {}", context, msg)),
                Error::InsufficientFunds(msg) => Error::InsufficientFunds(format!("{}: {}", context, msg)),
                Error::InsufficientShares(msg) => Error::InsufficientShares(format!("{}: {}", context, msg)),
                Error::NoPosition(msg) => Error::NoPosition(format!("{}: {}", context, msg)),
                Error::LimitExceeded(msg) => Error::LimitExceeded(format!("{}: {}", context, msg)),
                Error::InvariantViolation(msg) => Error::InvariantViolation(format!("{}: {}", context, msg)),
                Error::QuoteUnavailable(msg) => Error::QuoteUnavailable(format!("{}: {}", context, msg)),
                Error::StoreConflict(msg) => Error::StoreConflict(format!("{}: {}", context, msg)),
                Error::AccountNotFound(msg) => Error::AccountNotFound(format!("{}: {}", context, msg)),
                Error::ConfigurationError(msg) => Error::ConfigurationError(format!("{}: {}", context, msg)),
                Error::Database(e) => Error::Database(e),
                Error::Serialization(e) => Error::Serialization(e),
                Error::DecimalError(msg) => Error::DecimalError(format!("{}: {}", context, msg)),
                Error::Internal(msg) => Error::Internal(format!("{}: {}", context, msg)),
            }
        })
    }
}

/// Convert string messages into an error
impl From<String> for Error {
    fn from(message: String) -> Self {
        Error::Internal(message)
    }
}

/// Convert static string references into an error
impl From<&str> for Error {
    fn from(message: &str) -> Self {
        Error::Internal(message.to_string())
    }
}

/// From rust_decimal::Error
impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::DecimalError(err.to_string())
    }
}
