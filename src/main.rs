//! Demo runner for the paper-trading ledger engine
//!
//! Wires the trade engine to the in-memory store and a seeded quote
//! provider, then walks one account through a short trading session.

use std::sync::Arc;

use clap::Parser;
use dotenv::dotenv;
use ledger_store::InMemoryLedgerStore;
use quote_service::StaticQuoteProvider;
use rust_decimal_macros::dec;
use trade_engine::{EnginePolicy, OrderRequest, TradeEngine};
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Command line arguments
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Set the log level
    #[clap(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    let args = Args::parse();

    let log_level = args.log_level.parse::<Level>().unwrap_or(Level::INFO);
    let env_filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting PaperLedger demo...");

    let quotes = Arc::new(StaticQuoteProvider::new());
    quotes.set_quote("AAPL", "Apple Inc.", dec!(150.00));
    quotes.set_quote("NFLX", "Netflix Inc.", dec!(400.00));
    quotes.set_quote("TSLA", "Tesla Inc.", dec!(250.00));

    let store = Arc::new(InMemoryLedgerStore::new());
    let engine = TradeEngine::with_policy(store, quotes.clone(), EnginePolicy::from_env());

    let account = engine.create_account().await?;
    info!("Opened account {} with cash {}", account.id, account.cash);

    let quote = engine.quote("AAPL").await?;
    info!("Quote: {} ({}) at {}", quote.symbol, quote.name, quote.price);

    let receipt = engine.buy(account.id, &OrderRequest::new("AAPL", 10)?).await?;
    info!(
        "Bought {} x {} at {}: total {}, cash now {}",
        receipt.shares, receipt.symbol, receipt.unit_price, receipt.total, receipt.cash_after
    );

    let account_state = engine.deposit(account.id, dec!(500.00)).await?;
    info!("Deposited 500.00, cash now {}", account_state.cash);

    quotes.set_quote("AAPL", "Apple Inc.", dec!(160.00));
    let receipt = engine.sell(account.id, &OrderRequest::new("AAPL", 4)?).await?;
    info!(
        "Sold {} x {} at {}: total {}, cash now {}",
        receipt.shares, receipt.symbol, receipt.unit_price, receipt.total, receipt.cash_after
    );

    let valuation = engine.value(account.id).await?;
    for position in &valuation.positions {
        info!(
            "Position: {} x {} at {} = {}",
            position.shares, position.symbol, position.current_price, position.current_value
        );
    }
    info!("Portfolio value: {} (cash {})", valuation.total_value, valuation.cash);

    info!("Transaction history:");
    for entry in engine.history(account.id).await? {
        info!(
            "  {} {} {} total {}",
            entry.created_at.format("%Y-%m-%d %H:%M:%S"),
            entry.kind,
            entry.name,
            entry.total
        );
    }

    Ok(())
}
