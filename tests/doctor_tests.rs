// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use moneyflow::commands::doctor;
use moneyflow::models::{Account, AccountType, Transaction, TransactionType};
use moneyflow::repository::{Mutation, Repository, SqliteRepository};
use moneyflow::store::{Store, SyncPolicy};
use moneyflow::{db, utils};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn store_with_wallet() -> (Store<SqliteRepository>, String) {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    let mut store = Store::new(SqliteRepository::new(conn), SyncPolicy::Rollback);
    store.seed_default_categories();
    let a = Account::new("Wallet", AccountType::Cash, Decimal::from(40), "#22c55e");
    let id = a.id.clone();
    store.add_account(a).unwrap();
    store
        .add_transaction(Transaction {
            id: "t1".into(),
            date: "2025-05-04".parse().unwrap(),
            description: "Lunch".into(),
            amount: Decimal::from(12),
            r#type: TransactionType::Expense,
            category: "Food & Dining".into(),
            account_id: id.clone(),
            to_account_id: None,
        })
        .unwrap();
    (store, id)
}

#[test]
fn clean_store_has_no_issues() {
    let (store, _) = store_with_wallet();
    assert!(doctor::check(&store).is_empty());
}

#[test]
fn detects_balance_written_behind_the_ledger() {
    let (mut store, id) = store_with_wallet();
    store.repository().set_balance(&id, Decimal::from(99)).unwrap();
    store.load().unwrap();

    let issues = doctor::check(&store);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0][0], "balance_drift");
    assert!(issues[0][1].contains("off by 71"));
}

#[test]
fn flags_unknown_categories_and_pending_writes() {
    let (mut store, id) = store_with_wallet();
    store
        .add_transaction(Transaction {
            id: "t2".into(),
            date: "2025-05-05".parse().unwrap(),
            description: "Vet".into(),
            amount: Decimal::from(3),
            r#type: TransactionType::Expense,
            category: "Pets".into(),
            account_id: id,
            to_account_id: None,
        })
        .unwrap();
    store.restore_pending(vec![Mutation::DeleteTransaction { id: "gone".into() }]);

    let kinds: Vec<String> = doctor::check(&store).into_iter().map(|r| r[0].clone()).collect();
    assert_eq!(kinds, ["unknown_category", "pending_writes"]);
}

#[test]
fn settings_default_and_persist() {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    let mut s = utils::get_settings(&conn).unwrap();
    assert_eq!(s.currency, "USD");
    s.currency = "EUR".into();
    s.theme = "light".parse().unwrap();
    utils::save_settings(&conn, &s).unwrap();
    assert_eq!(utils::get_settings(&conn).unwrap(), s);
}
