//! Durable state for accounts, positions, and the transaction ledger
//!
//! The store owns the atomicity contract of the system: a cash mutation,
//! the matching position change, and the ledger entry either all commit or
//! none do. Two implementations are provided, a concurrent in-memory store
//! and a PostgreSQL store.

pub mod store;
pub mod memory;
pub mod postgres;
pub mod config;

pub use store::{AccountUpdate, LedgerStore};
pub use memory::InMemoryLedgerStore;
pub use postgres::PostgresLedgerStore;
pub use config::LedgerStoreConfig;
