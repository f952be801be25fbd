//! Common types and utilities for the paper-trading ledger
//!
//! This library contains the shared domain models, the unified error type,
//! and the decimal conventions used by every crate in the workspace. All
//! money flows through `rust_decimal` with explicit rounding points.

pub mod error;
pub mod model;
pub mod decimal;

/// Re-export important types
pub use error::{Error, Result, ErrorExt};
pub use decimal::*;
