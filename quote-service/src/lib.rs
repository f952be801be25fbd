//! Quote provider seam for the ledger engine
//!
//! The real price lookup lives outside this system; everything here treats
//! it as an opaque, potentially slow collaborator behind the
//! [`QuoteProvider`] trait.

mod provider;

pub use provider::{QuoteProvider, StaticQuoteProvider};
