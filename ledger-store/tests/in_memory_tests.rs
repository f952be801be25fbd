use common::decimal::dec;
use common::error::Error;
use common::model::ledger::{EntryKind, LedgerEntry};
use common::model::position::Position;
use ledger_store::{AccountUpdate, InMemoryLedgerStore, LedgerStore};
use uuid::Uuid;

#[tokio::test]
async fn test_create_and_get_account() {
    let store = InMemoryLedgerStore::new();

    let account = store.create_account(dec!(10000.00)).await.unwrap();
    assert_eq!(account.cash, dec!(10000.00));
    assert_eq!(account.version, 0);

    let fetched = store.get_account(account.id).await.unwrap().unwrap();
    assert_eq!(fetched.id, account.id);
    assert_eq!(fetched.cash, dec!(10000.00));

    assert!(store.get_account(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_apply_writes_cash_position_and_entry_together() {
    let store = InMemoryLedgerStore::new();
    let account = store.create_account(dec!(10000.00)).await.unwrap();

    let position = Position::new(account.id, "AAPL".to_string(), "Apple Inc.".to_string(), 10, dec!(150.00));
    let entry = LedgerEntry::trade(
        account.id,
        EntryKind::Buy,
        "AAPL".to_string(),
        "Apple Inc.".to_string(),
        10,
        dec!(150.00),
        dec!(1500.00),
    );

    store
        .apply(AccountUpdate {
            account_id: account.id,
            expected_version: account.version,
            new_cash: dec!(8500.00),
            position: Some(position),
            entry: Some(entry),
        })
        .await
        .unwrap();

    let account = store.get_account(account.id).await.unwrap().unwrap();
    assert_eq!(account.cash, dec!(8500.00));
    assert_eq!(account.version, 1);

    let position = store.get_position(account.id, "AAPL").await.unwrap().unwrap();
    assert_eq!(position.shares, 10);

    let entries = store.list_entries(account.id).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, EntryKind::Buy);
    assert_eq!(entries[0].total, dec!(1500.00));
}

#[tokio::test]
async fn test_stale_version_conflicts_and_applies_nothing() {
    let store = InMemoryLedgerStore::new();
    let account = store.create_account(dec!(1000.00)).await.unwrap();

    // First apply bumps the version to 1.
    store
        .apply(AccountUpdate {
            account_id: account.id,
            expected_version: 0,
            new_cash: dec!(900.00),
            position: None,
            entry: Some(LedgerEntry::withdraw(account.id, dec!(100.00))),
        })
        .await
        .unwrap();

    // Second apply still claims version 0 and must be rejected whole.
    let result = store
        .apply(AccountUpdate {
            account_id: account.id,
            expected_version: 0,
            new_cash: dec!(800.00),
            position: None,
            entry: Some(LedgerEntry::withdraw(account.id, dec!(100.00))),
        })
        .await;

    assert!(matches!(result, Err(Error::StoreConflict(_))));

    let account = store.get_account(account.id).await.unwrap().unwrap();
    assert_eq!(account.cash, dec!(900.00));
    assert_eq!(account.version, 1);
    assert_eq!(store.list_entries(account.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_apply_unknown_account() {
    let store = InMemoryLedgerStore::new();

    let result = store
        .apply(AccountUpdate {
            account_id: Uuid::new_v4(),
            expected_version: 0,
            new_cash: dec!(1.00),
            position: None,
            entry: None,
        })
        .await;

    assert!(matches!(result, Err(Error::AccountNotFound(_))));
}

#[tokio::test]
async fn test_open_positions_filter_keeps_zero_share_rows_out() {
    let store = InMemoryLedgerStore::new();
    let account = store.create_account(dec!(10000.00)).await.unwrap();

    let open = Position::new(account.id, "AAPL".to_string(), "Apple Inc.".to_string(), 5, dec!(150.00));
    let closed = Position::new(account.id, "NFLX".to_string(), "Netflix Inc.".to_string(), 0, dec!(400.00));

    store
        .apply(AccountUpdate {
            account_id: account.id,
            expected_version: 0,
            new_cash: account.cash,
            position: Some(open),
            entry: None,
        })
        .await
        .unwrap();
    store
        .apply(AccountUpdate {
            account_id: account.id,
            expected_version: 1,
            new_cash: account.cash,
            position: Some(closed),
            entry: None,
        })
        .await
        .unwrap();

    // The zero-share row persists but open-position queries never see it.
    let open_positions = store.list_open_positions(account.id).await.unwrap();
    assert_eq!(open_positions.len(), 1);
    assert_eq!(open_positions[0].symbol, "AAPL");

    let closed_row = store.get_position(account.id, "NFLX").await.unwrap().unwrap();
    assert_eq!(closed_row.shares, 0);
    assert!(!closed_row.is_open());
}

#[tokio::test]
async fn test_find_positions_returns_at_most_one_row() {
    let store = InMemoryLedgerStore::new();
    let account = store.create_account(dec!(10000.00)).await.unwrap();

    assert!(store.find_positions(account.id, "AAPL").await.unwrap().is_empty());

    let position = Position::new(account.id, "AAPL".to_string(), "Apple Inc.".to_string(), 3, dec!(150.00));
    store
        .apply(AccountUpdate {
            account_id: account.id,
            expected_version: 0,
            new_cash: account.cash,
            position: Some(position),
            entry: None,
        })
        .await
        .unwrap();

    let found = store.find_positions(account.id, "AAPL").await.unwrap();
    assert_eq!(found.len(), 1);
}

#[tokio::test]
async fn test_concurrent_applies_serialize_per_account() {
    use std::sync::Arc;

    let store = Arc::new(InMemoryLedgerStore::new());
    let account = store.create_account(dec!(1000.00)).await.unwrap();

    // Both tasks read version 0; exactly one may commit.
    let tasks: Vec<_> = (0..2)
        .map(|_| {
            let store = store.clone();
            let account_id = account.id;
            tokio::spawn(async move {
                store
                    .apply(AccountUpdate {
                        account_id,
                        expected_version: 0,
                        new_cash: dec!(500.00),
                        position: None,
                        entry: Some(LedgerEntry::withdraw(account_id, dec!(500.00))),
                    })
                    .await
            })
        })
        .collect();

    let results = futures::future::join_all(tasks).await;
    let successes = results
        .iter()
        .filter(|r| r.as_ref().unwrap().is_ok())
        .count();

    assert_eq!(successes, 1);

    let account = store.get_account(account.id).await.unwrap().unwrap();
    assert_eq!(account.cash, dec!(500.00));
    assert_eq!(store.list_entries(account.id).await.unwrap().len(), 1);
}
