// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use moneyflow::models::{Account, AccountType, Transaction, TransactionType};
use moneyflow::repository::SqliteRepository;
use moneyflow::store::{Store, SyncPolicy};
use moneyflow::{cli, commands::exporter, db};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde_json::json;
use tempfile::tempdir;

fn base_store() -> Store<SqliteRepository> {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    Store::new(SqliteRepository::new(conn), SyncPolicy::Rollback)
}

fn export(store: &Store<SqliteRepository>, format: &str, out: &str) -> anyhow::Result<()> {
    let matches = cli::build_cli().get_matches_from([
        "moneyflow",
        "export",
        "transactions",
        "--format",
        format,
        "--out",
        out,
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(store, export_m)
    } else {
        panic!("no export subcommand");
    }
}

#[test]
fn export_transactions_streams_pretty_json() {
    let mut store = base_store();
    let checking = Account::new("Checking", AccountType::Bank, Decimal::from(100), "#3b82f6");
    let savings = Account::new("Savings", AccountType::Bank, Decimal::ZERO, "#22c55e");
    let (from, to) = (checking.id.clone(), savings.id.clone());
    store.add_account(checking).unwrap();
    store.add_account(savings).unwrap();
    store
        .add_transaction(Transaction {
            id: "t1".into(),
            date: "2025-01-02".parse().unwrap(),
            description: "Corner Shop".into(),
            amount: "12.34".parse().unwrap(),
            r#type: TransactionType::Expense,
            category: "Food & Dining".into(),
            account_id: from.clone(),
            to_account_id: None,
        })
        .unwrap();
    store
        .add_transaction(Transaction {
            id: "t2".into(),
            date: "2025-01-03".parse().unwrap(),
            description: "Rainy day".into(),
            amount: Decimal::from(50),
            r#type: TransactionType::Transfer,
            category: "Transfer".into(),
            account_id: from,
            to_account_id: Some(to),
        })
        .unwrap();

    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.json");
    export(&store, "json", &out_path.to_string_lossy()).unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(
        parsed,
        json!([
            {
                "id": "t1",
                "date": "2025-01-02",
                "description": "Corner Shop",
                "type": "expense",
                "amount": "12.34",
                "category": "Food & Dining",
                "account": "Checking",
                "to_account": null
            },
            {
                "id": "t2",
                "date": "2025-01-03",
                "description": "Rainy day",
                "type": "transfer",
                "amount": "50",
                "category": "Transfer",
                "account": "Checking",
                "to_account": "Savings"
            }
        ])
    );
}

#[test]
fn export_transactions_writes_csv_header() {
    let store = base_store();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.csv");
    export(&store, "CSV", &out_path.to_string_lossy()).unwrap();
    let contents = std::fs::read_to_string(&out_path).unwrap();
    assert_eq!(
        contents.lines().next().unwrap(),
        "id,date,description,type,amount,category,account,to_account"
    );
}

#[test]
fn export_transactions_rejects_unknown_format() {
    let store = base_store();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.unknown");
    assert!(export(&store, "xml", &out_path.to_string_lossy()).is_err());
    assert!(!out_path.exists());
}
