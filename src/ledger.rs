// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Balance bookkeeping for accounts.
//!
//! Every account carries a cached balance that is moved directly by each
//! transaction event. The functions here are pure: they take an account
//! snapshot and return (or mutate) a snapshot, and never talk to storage.

use crate::error::{StoreError, StoreResult};
use crate::models::{Account, Transaction, TransactionType};
use rust_decimal::Decimal;
use serde::Serialize;

fn position(accounts: &[Account], id: &str) -> Option<usize> {
    accounts.iter().position(|a| a.id == id)
}

/// Moves balances by `sign * effect(tx)`. A missing source account makes the
/// whole transaction a no-op; a missing transfer destination only skips the
/// credit side.
fn shift(accounts: &mut [Account], tx: &Transaction, sign: Decimal) {
    let Some(src) = position(accounts, &tx.account_id) else {
        return;
    };
    let amount = tx.amount * sign;
    match tx.r#type {
        TransactionType::Income => accounts[src].balance += amount,
        TransactionType::Expense => accounts[src].balance -= amount,
        TransactionType::Transfer => {
            let Some(to) = tx.to_account_id.as_deref() else {
                return;
            };
            accounts[src].balance -= amount;
            if let Some(dst) = position(accounts, to) {
                accounts[dst].balance += amount;
            }
        }
    }
}

/// Applies the effect of a new transaction to the snapshot.
pub fn apply(accounts: &mut [Account], tx: &Transaction) {
    shift(accounts, tx, Decimal::ONE);
}

/// Exact inverse of [`apply`].
pub fn revert(accounts: &mut [Account], tx: &Transaction) {
    shift(accounts, tx, Decimal::NEGATIVE_ONE);
}

/// Recomputes balances for a create (`old = None`), update, or delete
/// (`new = None`). The old effect is reverted first and the new one applied
/// against the already-reverted snapshot, so edits that move the source
/// account, amount or type converge in one pass.
pub fn rebalance(
    accounts: &[Account],
    old: Option<&Transaction>,
    new: Option<&Transaction>,
) -> Vec<Account> {
    let mut next = accounts.to_vec();
    if let Some(old) = old {
        revert(&mut next, old);
    }
    if let Some(new) = new {
        apply(&mut next, new);
    }
    next
}

/// Signed amount `tx` contributes to the balance of `account_id`.
pub fn signed_effect(tx: &Transaction, account_id: &str) -> Decimal {
    match tx.r#type {
        TransactionType::Income if tx.account_id == account_id => tx.amount,
        TransactionType::Expense if tx.account_id == account_id => -tx.amount,
        TransactionType::Transfer => match tx.to_account_id.as_deref() {
            None => Decimal::ZERO,
            Some(to) if to == account_id => tx.amount,
            Some(_) if tx.account_id == account_id => -tx.amount,
            Some(_) => Decimal::ZERO,
        },
        _ => Decimal::ZERO,
    }
}

/// Sum of the effects of all live transactions on one account.
pub fn net_effect(transactions: &[Transaction], account_id: &str) -> Decimal {
    transactions
        .iter()
        .map(|t| signed_effect(t, account_id))
        .sum()
}

/// Balance the account would have if `original` (the transaction being
/// edited) had never been applied. Only an original on the same source
/// account is added back.
pub fn available_balance(account: &Account, original: Option<&Transaction>) -> Decimal {
    let mut available = account.balance;
    if let Some(orig) = original.filter(|o| o.account_id == account.id) {
        match orig.r#type {
            TransactionType::Expense | TransactionType::Transfer => available += orig.amount,
            TransactionType::Income => available -= orig.amount,
        }
    }
    available
}

/// Advisory pre-write check for expenses and transfers. Income never fails.
/// This guards user input only; balances can still go negative.
pub fn ensure_sufficient_funds(
    account: &Account,
    tx: &Transaction,
    original: Option<&Transaction>,
) -> StoreResult<()> {
    if tx.r#type == TransactionType::Income || tx.account_id != account.id {
        return Ok(());
    }
    let available = available_balance(account, original);
    if tx.amount > available {
        return Err(StoreError::InsufficientFunds {
            account: account.name.clone(),
            available,
            requested: tx.amount,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Drift {
    pub account_id: String,
    pub account: String,
    pub expected: Decimal,
    pub actual: Decimal,
}

impl Drift {
    pub fn delta(&self) -> Decimal {
        self.actual - self.expected
    }
}

/// Accounts whose cached balance disagrees with
/// `opening_balance + net_effect(transactions)`.
pub fn drift(accounts: &[Account], transactions: &[Transaction]) -> Vec<Drift> {
    accounts
        .iter()
        .filter_map(|a| {
            let expected = a.opening_balance + net_effect(transactions, &a.id);
            (expected != a.balance).then(|| Drift {
                account_id: a.id.clone(),
                account: a.name.clone(),
                expected,
                actual: a.balance,
            })
        })
        .collect()
}
