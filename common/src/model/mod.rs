//! Domain models for the ledger engine

pub mod account;
pub mod position;
pub mod ledger;
pub mod quote;
