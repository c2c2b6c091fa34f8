// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use moneyflow::error::StoreError;
use moneyflow::ledger::{self, apply, ensure_sufficient_funds, rebalance, revert};
use moneyflow::models::{Account, AccountType, Transaction, TransactionType};
use rust_decimal::Decimal;

fn acct(id: &str, balance: i64) -> Account {
    Account {
        id: id.into(),
        name: id.to_uppercase(),
        r#type: AccountType::Bank,
        balance: Decimal::from(balance),
        color: "#3b82f6".into(),
        opening_balance: Decimal::from(balance),
    }
}

fn tx(id: &str, r#type: TransactionType, amount: i64, from: &str, to: Option<&str>) -> Transaction {
    Transaction {
        id: id.into(),
        date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
        description: "test".into(),
        amount: Decimal::from(amount),
        r#type,
        category: "Other".into(),
        account_id: from.into(),
        to_account_id: to.map(str::to_string),
    }
}

fn balances(accounts: &[Account]) -> Vec<i64> {
    accounts
        .iter()
        .map(|a| i64::try_from(a.balance).unwrap())
        .collect()
}

#[test]
fn transfer_create_edit_delete_walkthrough() {
    let accounts = vec![acct("a", 100), acct("b", 0)];
    let t1 = tx("t1", TransactionType::Transfer, 30, "a", Some("b"));

    let after_add = rebalance(&accounts, None, Some(&t1));
    assert_eq!(balances(&after_add), vec![70, 30]);

    let mut t1_edit = t1.clone();
    t1_edit.amount = Decimal::from(50);
    let after_edit = rebalance(&after_add, Some(&t1), Some(&t1_edit));
    assert_eq!(balances(&after_edit), vec![50, 50]);

    let after_delete = rebalance(&after_edit, Some(&t1_edit), None);
    assert_eq!(balances(&after_delete), vec![100, 0]);
}

#[test]
fn income_and_expense_only_touch_the_source() {
    let mut accounts = vec![acct("a", 100), acct("b", 5)];
    apply(&mut accounts, &tx("i", TransactionType::Income, 40, "a", None));
    apply(&mut accounts, &tx("e", TransactionType::Expense, 15, "a", None));
    assert_eq!(balances(&accounts), vec![125, 5]);
}

#[test]
fn revert_undoes_apply_for_every_type() {
    let start = vec![acct("a", 100), acct("b", 20)];
    for t in [
        tx("i", TransactionType::Income, 12, "a", None),
        tx("e", TransactionType::Expense, 250, "a", None),
        tx("x", TransactionType::Transfer, 7, "b", Some("a")),
    ] {
        let mut accounts = start.clone();
        apply(&mut accounts, &t);
        revert(&mut accounts, &t);
        assert_eq!(accounts, start, "round trip for {}", t.r#type);
    }
}

#[test]
fn edit_moving_source_account_converges_in_one_pass() {
    let accounts = vec![acct("a", 70), acct("b", 50)];
    let old = tx("t", TransactionType::Expense, 30, "a", None);
    let new = tx("t", TransactionType::Income, 10, "b", None);
    let next = rebalance(&accounts, Some(&old), Some(&new));
    assert_eq!(balances(&next), vec![100, 60]);
    // input snapshot is left untouched
    assert_eq!(balances(&accounts), vec![70, 50]);
}

#[test]
fn unknown_source_is_a_no_op_and_unknown_destination_only_debits() {
    let mut accounts = vec![acct("a", 100)];
    apply(&mut accounts, &tx("g", TransactionType::Expense, 10, "ghost", None));
    assert_eq!(balances(&accounts), vec![100]);

    apply(&mut accounts, &tx("x", TransactionType::Transfer, 10, "a", Some("ghost")));
    assert_eq!(balances(&accounts), vec![90]);
}

#[test]
fn funds_check_blocks_overdrafts_on_create() {
    let a = acct("a", 50);
    let err = ensure_sufficient_funds(&a, &tx("t", TransactionType::Expense, 80, "a", None), None)
        .unwrap_err();
    match err {
        StoreError::InsufficientFunds {
            available,
            requested,
            ..
        } => {
            assert_eq!(available, Decimal::from(50));
            assert_eq!(requested, Decimal::from(80));
        }
        other => panic!("unexpected error {other}"),
    }
    assert!(
        ensure_sufficient_funds(&a, &tx("t", TransactionType::Transfer, 50, "a", Some("b")), None)
            .is_ok()
    );
    assert!(
        ensure_sufficient_funds(&a, &tx("t", TransactionType::Income, 5000, "a", None), None)
            .is_ok()
    );
}

#[test]
fn funds_check_adds_back_original_on_same_account() {
    // 100 opening, 80 already spent by the transaction being edited
    let a = acct("a", 20);
    let original = tx("t", TransactionType::Expense, 80, "a", None);
    let mut edited = original.clone();
    edited.amount = Decimal::from(90);
    assert!(ensure_sufficient_funds(&a, &edited, Some(&original)).is_ok());
    edited.amount = Decimal::from(101);
    assert!(ensure_sufficient_funds(&a, &edited, Some(&original)).is_err());

    // an income being turned into an expense no longer counts
    let income = tx("t", TransactionType::Income, 30, "a", None);
    let expense = tx("t", TransactionType::Expense, 20, "a", None);
    assert_eq!(ledger::available_balance(&a, Some(&income)), Decimal::from(-10));
    assert!(ensure_sufficient_funds(&a, &expense, Some(&income)).is_err());
}

#[test]
fn funds_check_ignores_original_on_other_account() {
    let b = acct("b", 10);
    let original = tx("t", TransactionType::Expense, 80, "a", None);
    let moved = tx("t", TransactionType::Expense, 50, "b", None);
    assert!(ensure_sufficient_funds(&b, &moved, Some(&original)).is_err());
}

#[test]
fn drift_reports_only_inconsistent_accounts() {
    let txs = vec![
        tx("t1", TransactionType::Transfer, 30, "a", Some("b")),
        tx("t2", TransactionType::Expense, 5, "b", None),
    ];
    let mut accounts = vec![acct("a", 100), acct("b", 0)];
    for t in &txs {
        apply(&mut accounts, t);
    }
    assert!(ledger::drift(&accounts, &txs).is_empty());
    assert_eq!(ledger::net_effect(&txs, "b"), Decimal::from(25));

    accounts[1].balance += Decimal::from(3);
    let d = ledger::drift(&accounts, &txs);
    assert_eq!(d.len(), 1);
    assert_eq!(d[0].account_id, "b");
    assert_eq!(d[0].delta(), Decimal::from(3));
}

#[test]
fn transfer_edited_into_expense_releases_destination() {
    let accounts = vec![acct("a", 100), acct("b", 0)];
    let t = tx("t1", TransactionType::Transfer, 40, "a", Some("b"));
    let after_add = rebalance(&accounts, None, Some(&t));
    assert_eq!(balances(&after_add), vec![60, 40]);

    let expense = tx("t1", TransactionType::Expense, 40, "a", None);
    let after_edit = rebalance(&after_add, Some(&t), Some(&expense));
    assert_eq!(balances(&after_edit), vec![60, 0]);
}

#[test]
fn expense_edited_into_income_raises_by_both_amounts() {
    let accounts = vec![acct("a", 100)];
    let old = tx("t", TransactionType::Expense, 30, "a", None);
    let new = tx("t", TransactionType::Income, 20, "a", None);
    let before = rebalance(&accounts, None, Some(&old));
    let after = rebalance(&before, Some(&old), Some(&new));
    assert_eq!(after[0].balance - before[0].balance, Decimal::from(50));
}

#[test]
fn changing_transfer_destination_moves_the_credit() {
    let accounts = vec![acct("a", 100), acct("b", 0), acct("c", 0)];
    let old = tx("t", TransactionType::Transfer, 25, "a", Some("b"));
    let new = tx("t", TransactionType::Transfer, 25, "a", Some("c"));
    let before = rebalance(&accounts, None, Some(&old));
    let after = rebalance(&before, Some(&old), Some(&new));
    assert_eq!(balances(&after), vec![75, 0, 25]);
}

#[test]
fn net_effect_matches_balance_change_over_a_sequence() {
    let mut accounts = vec![acct("a", 100), acct("b", 10)];
    let mut live: Vec<Transaction> = Vec::new();
    let script = [
        (None, Some(tx("1", TransactionType::Income, 5, "a", None))),
        (None, Some(tx("2", TransactionType::Transfer, 30, "a", Some("b")))),
        (None, Some(tx("3", TransactionType::Expense, 7, "b", None))),
        (
            Some("2"),
            Some(tx("2", TransactionType::Transfer, 12, "b", Some("a"))),
        ),
        (Some("1"), None),
    ];
    for (old_id, new) in script {
        let old = old_id.and_then(|id| live.iter().find(|t| t.id == id).cloned());
        accounts = rebalance(&accounts, old.as_ref(), new.as_ref());
        live.retain(|t| Some(t.id.as_str()) != old_id);
        live.extend(new);
    }
    for a in &accounts {
        assert_eq!(a.balance - a.opening_balance, ledger::net_effect(&live, &a.id));
    }
    assert!(ledger::drift(&accounts, &live).is_empty());
}
