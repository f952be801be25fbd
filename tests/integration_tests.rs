//! Workspace integration tests exercising the engine, store, and quote
//! provider together.

use std::sync::Arc;

use ledger_store::InMemoryLedgerStore;
use quote_service::StaticQuoteProvider;
use rust_decimal_macros::dec;
use trade_engine::{EnginePolicy, OrderRequest, TradeEngine};

fn setup() -> (Arc<TradeEngine>, Arc<StaticQuoteProvider>) {
    let store = Arc::new(InMemoryLedgerStore::new());
    let quotes = Arc::new(StaticQuoteProvider::new());
    quotes.set_quote("AAPL", "Apple Inc.", dec!(150.00));
    quotes.set_quote("TSLA", "Tesla Inc.", dec!(250.00));
    (Arc::new(TradeEngine::new(store, quotes.clone())), quotes)
}

#[tokio::test]
async fn test_full_trading_session() {
    let (engine, quotes) = setup();

    let account = engine.create_account().await.unwrap();
    assert_eq!(account.cash, dec!(10000.00));

    engine.deposit(account.id, dec!(2000.00)).await.unwrap();
    engine.buy(account.id, &OrderRequest::new("AAPL", 20).unwrap()).await.unwrap();
    engine.buy(account.id, &OrderRequest::new("TSLA", 8).unwrap()).await.unwrap();

    // 12000 - 3000 - 2000
    let account_state = engine.get_account(account.id).await.unwrap();
    assert_eq!(account_state.cash, dec!(7000.00));

    quotes.set_quote("AAPL", "Apple Inc.", dec!(145.00));
    engine.sell(account.id, &OrderRequest::new("AAPL", 20).unwrap()).await.unwrap();

    let valuation = engine.value(account.id).await.unwrap();
    assert_eq!(valuation.cash, dec!(9900.00));
    assert_eq!(valuation.positions.len(), 1);
    assert_eq!(valuation.positions[0].symbol, "TSLA");
    assert_eq!(valuation.total_value, dec!(9900.00) + dec!(2000.00));

    // Ledger is append-only and complete: deposit, two buys, one sell.
    let history = engine.history(account.id).await.unwrap();
    assert_eq!(history.len(), 4);
}

#[tokio::test]
async fn test_accounts_are_independent() {
    let (engine, _quotes) = setup();

    let alice = engine.create_account().await.unwrap();
    let bob = engine.create_account().await.unwrap();

    engine.buy(alice.id, &OrderRequest::new("AAPL", 10).unwrap()).await.unwrap();
    engine.withdraw(bob.id, dec!(5000.00)).await.unwrap();

    let alice_state = engine.get_account(alice.id).await.unwrap();
    let bob_state = engine.get_account(bob.id).await.unwrap();
    assert_eq!(alice_state.cash, dec!(8500.00));
    assert_eq!(bob_state.cash, dec!(5000.00));

    assert_eq!(engine.history(alice.id).await.unwrap().len(), 1);
    assert_eq!(engine.history(bob.id).await.unwrap().len(), 1);
    assert!(engine.value(bob.id).await.unwrap().positions.is_empty());
}

#[tokio::test]
async fn test_reference_scenario() {
    // The canonical session: 10000 cash, buy 10 AAPL at 150, sell 4 at 160,
    // then value the remainder at 160.
    let (engine, quotes) = setup();
    let account = engine.create_account().await.unwrap();

    let buy = engine.buy(account.id, &OrderRequest::new("AAPL", 10).unwrap()).await.unwrap();
    assert_eq!(buy.total, dec!(1500.00));
    assert_eq!(buy.cash_after, dec!(8500.00));

    quotes.set_quote("AAPL", "Apple Inc.", dec!(160.00));
    let sell = engine.sell(account.id, &OrderRequest::new("AAPL", 4).unwrap()).await.unwrap();
    assert_eq!(sell.total, dec!(640.00));
    assert_eq!(sell.cash_after, dec!(9140.00));
    assert_eq!(sell.shares_after, 6);

    let valuation = engine.value(account.id).await.unwrap();
    assert_eq!(valuation.total_value, dec!(10100.00));
}

#[tokio::test]
async fn test_balance_ceiling_scenario() {
    use common::error::Error;

    let store = Arc::new(InMemoryLedgerStore::new());
    let quotes = Arc::new(StaticQuoteProvider::new());
    let engine = TradeEngine::with_policy(
        store,
        quotes,
        EnginePolicy::new(dec!(100000.00), dec!(100000.00), 3),
    );

    let account = engine.create_account().await.unwrap();
    let result = engine.deposit(account.id, dec!(1.00)).await;
    assert!(matches!(result, Err(Error::LimitExceeded(_))));

    let account = engine.get_account(account.id).await.unwrap();
    assert_eq!(account.cash, dec!(100000.00));
    assert!(engine.history(account.id).await.unwrap().is_empty());
}
