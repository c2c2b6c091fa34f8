// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Persistence boundary between the in-memory store and whatever backend
//! holds the authoritative rows.

pub mod rest;
pub mod sqlite;

use crate::error::StoreResult;
use crate::models::{Account, Category, Transaction};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use rest::{RestConfig, RestRepository};
pub use sqlite::SqliteRepository;

pub trait Repository {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Whether `opening_balance` round-trips through this backend. When it
    /// does not, the store derives it from the loaded balances.
    fn stores_opening_balance(&self) -> bool {
        true
    }

    fn fetch_accounts(&self) -> StoreResult<Vec<Account>>;
    fn fetch_transactions(&self) -> StoreResult<Vec<Transaction>>;
    fn fetch_categories(&self) -> StoreResult<Vec<Category>>;

    /// Inserts the account or replaces the row with the same id.
    fn upsert_account(&self, account: &Account) -> StoreResult<()>;
    fn delete_account(&self, id: &str) -> StoreResult<()>;
    fn set_balance(&self, account_id: &str, balance: Decimal) -> StoreResult<()>;

    fn insert_transaction(&self, tx: &Transaction) -> StoreResult<()>;
    fn update_transaction(&self, tx: &Transaction) -> StoreResult<()>;
    fn delete_transaction(&self, id: &str) -> StoreResult<()>;

    fn upsert_category(&self, category: &Category) -> StoreResult<()>;
    fn delete_category(&self, id: &str) -> StoreResult<()>;
}

impl<R: Repository + ?Sized> Repository for Box<R> {
    fn name(&self) -> &str {
        (**self).name()
    }
    fn stores_opening_balance(&self) -> bool {
        (**self).stores_opening_balance()
    }
    fn fetch_accounts(&self) -> StoreResult<Vec<Account>> {
        (**self).fetch_accounts()
    }
    fn fetch_transactions(&self) -> StoreResult<Vec<Transaction>> {
        (**self).fetch_transactions()
    }
    fn fetch_categories(&self) -> StoreResult<Vec<Category>> {
        (**self).fetch_categories()
    }
    fn upsert_account(&self, account: &Account) -> StoreResult<()> {
        (**self).upsert_account(account)
    }
    fn delete_account(&self, id: &str) -> StoreResult<()> {
        (**self).delete_account(id)
    }
    fn set_balance(&self, account_id: &str, balance: Decimal) -> StoreResult<()> {
        (**self).set_balance(account_id, balance)
    }
    fn insert_transaction(&self, tx: &Transaction) -> StoreResult<()> {
        (**self).insert_transaction(tx)
    }
    fn update_transaction(&self, tx: &Transaction) -> StoreResult<()> {
        (**self).update_transaction(tx)
    }
    fn delete_transaction(&self, id: &str) -> StoreResult<()> {
        (**self).delete_transaction(id)
    }
    fn upsert_category(&self, category: &Category) -> StoreResult<()> {
        (**self).upsert_category(category)
    }
    fn delete_category(&self, id: &str) -> StoreResult<()> {
        (**self).delete_category(id)
    }
}

/// One remote write. Serializable so queued writes can be persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    UpsertAccount { account: Account },
    DeleteAccount { id: String },
    SetBalance { account_id: String, balance: Decimal },
    InsertTransaction { transaction: Transaction },
    UpdateTransaction { transaction: Transaction },
    DeleteTransaction { id: String },
    UpsertCategory { category: Category },
    DeleteCategory { id: String },
}

impl Mutation {
    pub fn send<R: Repository + ?Sized>(&self, repo: &R) -> StoreResult<()> {
        match self {
            Mutation::UpsertAccount { account } => repo.upsert_account(account),
            Mutation::DeleteAccount { id } => repo.delete_account(id),
            Mutation::SetBalance {
                account_id,
                balance,
            } => repo.set_balance(account_id, *balance),
            Mutation::InsertTransaction { transaction } => repo.insert_transaction(transaction),
            Mutation::UpdateTransaction { transaction } => repo.update_transaction(transaction),
            Mutation::DeleteTransaction { id } => repo.delete_transaction(id),
            Mutation::UpsertCategory { category } => repo.upsert_category(category),
            Mutation::DeleteCategory { id } => repo.delete_category(id),
        }
    }

    /// Short label for logs and `sync status`.
    pub fn describe(&self) -> String {
        match self {
            Mutation::UpsertAccount { account } => format!("upsert account {}", account.name),
            Mutation::DeleteAccount { id } => format!("delete account {}", id),
            Mutation::SetBalance {
                account_id,
                balance,
            } => format!("set balance {} = {}", account_id, balance),
            Mutation::InsertTransaction { transaction } => {
                format!("insert transaction {}", transaction.id)
            }
            Mutation::UpdateTransaction { transaction } => {
                format!("update transaction {}", transaction.id)
            }
            Mutation::DeleteTransaction { id } => format!("delete transaction {}", id),
            Mutation::UpsertCategory { category } => format!("upsert category {}", category.name),
            Mutation::DeleteCategory { id } => format!("delete category {}", id),
        }
    }
}

/// A forward write paired with the write that undoes it.
#[derive(Debug, Clone)]
pub struct Step {
    pub forward: Mutation,
    pub inverse: Vec<Mutation>,
}

impl Step {
    pub fn new(forward: Mutation, inverse: Vec<Mutation>) -> Self {
        Self { forward, inverse }
    }
}
