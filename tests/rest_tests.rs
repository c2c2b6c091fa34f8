// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use moneyflow::error::StoreError;
use moneyflow::models::{Account, AccountType, Category, CategoryKind, Transaction, TransactionType};
use moneyflow::repository::rest::{AccountRow, CategoryRow, TransactionRow};
use moneyflow::repository::{RestConfig, RestRepository, Repository};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

fn repo(base_url: &str) -> RestRepository {
    RestRepository::new(RestConfig {
        base_url: base_url.into(),
        api_key: "anon".into(),
        access_token: None,
        user_id: Some("u1".into()),
        timeout_secs: 5,
    })
    .unwrap()
}

/// What the stub server saw.
struct Captured {
    method: String,
    target: String,
    headers: HashMap<String, String>,
    body: Value,
}

/// Serves a single HTTP request with `status` and `reply`, returning the
/// base URL and a handle yielding the captured request.
fn serve_once(status: &'static str, reply: Value) -> (String, JoinHandle<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        let mut parts = line.split_whitespace();
        let method = parts.next().unwrap().to_string();
        let target = parts.next().unwrap().to_string();

        let mut headers = HashMap::new();
        loop {
            let mut h = String::new();
            reader.read_line(&mut h).unwrap();
            let h = h.trim_end();
            if h.is_empty() {
                break;
            }
            let (k, v) = h.split_once(':').unwrap();
            headers.insert(k.trim().to_lowercase(), v.trim().to_string());
        }
        let len = headers
            .get("content-length")
            .map(|v| v.parse::<usize>().unwrap())
            .unwrap_or(0);
        let mut raw = vec![0; len];
        reader.read_exact(&mut raw).unwrap();
        let body = if raw.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&raw).unwrap()
        };

        let payload = if reply.is_null() {
            String::new()
        } else {
            reply.to_string()
        };
        let mut out = stream;
        write!(
            out,
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            payload.len(),
            payload
        )
        .unwrap();
        out.flush().unwrap();
        Captured {
            method,
            target,
            headers,
            body,
        }
    });
    (base, handle)
}

fn transfer() -> Transaction {
    Transaction {
        id: "t1".into(),
        date: "2025-02-03".parse().unwrap(),
        description: "Savings".into(),
        amount: "25.5".parse().unwrap(),
        r#type: TransactionType::Transfer,
        category: "Transfer".into(),
        account_id: "a".into(),
        to_account_id: Some("b".into()),
    }
}

#[test]
fn rejected_request_becomes_remote_error() {
    let (base, server) = serve_once("409 Conflict", json!({ "message": "duplicate key" }));
    let err = repo(&base).insert_transaction(&transfer()).unwrap_err();
    let req = server.join().unwrap();

    assert_eq!(req.method, "POST");
    assert_eq!(req.target, "/rest/v1/transactions");
    assert_eq!(req.body["user_id"], "u1");
    match err {
        StoreError::Remote(msg) => {
            assert!(msg.contains("409"), "{}", msg);
            assert!(msg.contains("duplicate key"), "{}", msg);
        }
        other => panic!("expected a remote error, got {:?}", other),
    }
}

#[test]
fn editing_transfer_into_expense_clears_destination_remotely() {
    let mut t = transfer();
    t.r#type = TransactionType::Expense;
    t.to_account_id = None;

    let (base, server) = serve_once("204 No Content", Value::Null);
    repo(&base).update_transaction(&t).unwrap();
    let req = server.join().unwrap();

    assert_eq!(req.method, "PATCH");
    assert_eq!(req.target, "/rest/v1/transactions?id=eq.t1");
    assert_eq!(req.headers["prefer"], "return=minimal");
    assert_eq!(req.headers["apikey"], "anon");
    assert_eq!(req.headers["authorization"], "Bearer anon");
    let body = req.body.as_object().unwrap();
    assert_eq!(body.get("to_account_id"), Some(&Value::Null));
    assert_eq!(body["type"], "expense");
    assert!(!body.contains_key("user_id"));
}

#[test]
fn account_upsert_merges_duplicates() {
    let a = Account::new("Cash", AccountType::Cash, Decimal::from(12), "#22c55e");
    let (base, server) = serve_once("201 Created", Value::Null);
    repo(&base).upsert_account(&a).unwrap();
    let req = server.join().unwrap();

    assert_eq!(req.method, "POST");
    assert_eq!(req.target, "/rest/v1/accounts");
    assert!(req.headers["prefer"].contains("resolution=merge-duplicates"));
    assert_eq!(req.body["id"], a.id.as_str());
    assert_eq!(req.body["user_id"], "u1");
    assert!(req.body.get("opening_balance").is_none());
}

#[test]
fn fetch_filters_rows_by_user() {
    let rows = json!([{
        "id": "x", "user_id": "u1", "name": "Cash", "type": "cash",
        "balance": "12.00", "color": "#22c55e"
    }]);
    let (base, server) = serve_once("200 OK", rows);
    let accounts = repo(&base).fetch_accounts().unwrap();
    let req = server.join().unwrap();

    assert_eq!(req.method, "GET");
    assert_eq!(req.target, "/rest/v1/accounts?select=*&user_id=eq.u1");
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].name, "Cash");
    assert_eq!(accounts[0].balance, Decimal::from(12));
}

#[test]
fn table_urls_trim_trailing_slash() {
    let r = repo("https://project.example.co/");
    assert_eq!(
        r.url("accounts", None),
        "https://project.example.co/rest/v1/accounts"
    );
    assert_eq!(
        r.url("transactions", Some("t1")),
        "https://project.example.co/rest/v1/transactions?id=eq.t1"
    );
}

#[test]
fn transaction_rows_use_snake_case_columns() {
    let t = Transaction {
        id: "t1".into(),
        date: "2025-02-03".parse().unwrap(),
        description: "Savings".into(),
        amount: "25.5".parse().unwrap(),
        r#type: TransactionType::Transfer,
        category: "Transfer".into(),
        account_id: "a".into(),
        to_account_id: Some("b".into()),
    };
    let row = TransactionRow::from_transaction(&t, Some("u1"));
    let v = serde_json::to_value(&row).unwrap();
    assert_eq!(v["account_id"], "a");
    assert_eq!(v["to_account_id"], "b");
    assert_eq!(v["user_id"], "u1");
    assert_eq!(v["type"], "transfer");
    assert!(v.get("accountId").is_none());

    let back: Transaction = serde_json::from_value::<TransactionRow>(v).unwrap().into();
    assert_eq!(back, t);
}

#[test]
fn account_rows_never_carry_local_fields() {
    let mut a = Account::new("Card", AccountType::Credit, Decimal::from(-20), "#f43f5e");
    a.opening_balance = Decimal::from(10);
    let v = serde_json::to_value(AccountRow::from_account(&a, None)).unwrap();
    assert!(v.get("opening_balance").is_none());
    assert!(v.get("user_id").is_none());
    assert_eq!(v["type"], "credit");

    let remote: AccountRow = serde_json::from_value(json!({
        "id": "x", "user_id": "u1", "name": "Cash", "type": "cash",
        "balance": "12.00", "color": "#22c55e", "created_at": "2025-01-01T00:00:00Z"
    }))
    .unwrap();
    let acct = Account::from(remote);
    assert_eq!(acct.balance, "12".parse::<Decimal>().unwrap());
}

#[test]
fn category_rows_map_kind_to_type_column() {
    let mut c = Category::new("Salary", CategoryKind::Income, "#10b981");
    c.budget = Some(Decimal::from(100));
    let v = serde_json::to_value(CategoryRow::from_category(&c, Some("u1"))).unwrap();
    assert_eq!(v["type"], "income");
    assert!(v.get("budget").is_none());
    let back = Category::from(serde_json::from_value::<CategoryRow>(v).unwrap());
    assert_eq!(back.kind, CategoryKind::Income);
    assert_eq!(back.budget, None);
}
