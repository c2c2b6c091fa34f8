// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Hosted backend over a PostgREST-style HTTP API.
//!
//! Remote rows use snake_case columns (`account_id`, `to_account_id`) and
//! carry the owning `user_id`. Local-only fields (`opening_balance`,
//! category budgets) are never sent.

use super::Repository;
use crate::error::{StoreError, StoreResult};
use crate::models::{
    Account, AccountType, Category, CategoryKind, Transaction, TransactionType,
};
use chrono::NaiveDate;
use reqwest::blocking::{Client, RequestBuilder, Response};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone)]
pub struct RestConfig {
    pub base_url: String,
    pub api_key: String,
    /// Session token; falls back to the API key.
    pub access_token: Option<String>,
    pub user_id: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRow {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub name: String,
    pub r#type: AccountType,
    pub balance: Decimal,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRow {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub r#type: TransactionType,
    pub category: String,
    pub account_id: String,
    pub to_account_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRow {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub name: String,
    pub r#type: CategoryKind,
    pub color: String,
}

impl AccountRow {
    pub fn from_account(a: &Account, user_id: Option<&str>) -> Self {
        Self {
            id: a.id.clone(),
            user_id: user_id.map(str::to_string),
            name: a.name.clone(),
            r#type: a.r#type,
            balance: a.balance,
            color: a.color.clone(),
        }
    }
}

impl From<AccountRow> for Account {
    fn from(r: AccountRow) -> Self {
        Account {
            id: r.id,
            name: r.name,
            r#type: r.r#type,
            balance: r.balance,
            color: r.color,
            opening_balance: r.balance,
        }
    }
}

impl TransactionRow {
    pub fn from_transaction(t: &Transaction, user_id: Option<&str>) -> Self {
        Self {
            id: t.id.clone(),
            user_id: user_id.map(str::to_string),
            date: t.date,
            description: t.description.clone(),
            amount: t.amount,
            r#type: t.r#type,
            category: t.category.clone(),
            account_id: t.account_id.clone(),
            to_account_id: t.to_account_id.clone(),
        }
    }
}

impl From<TransactionRow> for Transaction {
    fn from(r: TransactionRow) -> Self {
        Transaction {
            id: r.id,
            date: r.date,
            description: r.description,
            amount: r.amount,
            r#type: r.r#type,
            category: r.category,
            account_id: r.account_id,
            to_account_id: r.to_account_id,
        }
    }
}

impl CategoryRow {
    pub fn from_category(c: &Category, user_id: Option<&str>) -> Self {
        Self {
            id: c.id.clone(),
            user_id: user_id.map(str::to_string),
            name: c.name.clone(),
            r#type: c.kind,
            color: c.color.clone(),
        }
    }
}

impl From<CategoryRow> for Category {
    fn from(r: CategoryRow) -> Self {
        Category {
            id: r.id,
            name: r.name,
            kind: r.r#type,
            color: r.color,
            budget: None,
        }
    }
}

pub struct RestRepository {
    client: Client,
    cfg: RestConfig,
}

impl RestRepository {
    pub fn new(cfg: RestConfig) -> anyhow::Result<Self> {
        let client = crate::utils::http_client(cfg.timeout_secs)?;
        Ok(Self { client, cfg })
    }

    /// Table endpoint, optionally narrowed to one row by id.
    pub fn url(&self, table: &str, id: Option<&str>) -> String {
        let base = self.cfg.base_url.trim_end_matches('/');
        match id {
            Some(id) => format!("{}/rest/v1/{}?id=eq.{}", base, table, id),
            None => format!("{}/rest/v1/{}", base, table),
        }
    }

    fn authed(&self, rb: RequestBuilder) -> RequestBuilder {
        let token = self
            .cfg
            .access_token
            .as_deref()
            .unwrap_or(&self.cfg.api_key);
        rb.header("apikey", &self.cfg.api_key).bearer_auth(token)
    }

    fn check(&self, what: &str, resp: Response) -> StoreResult<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().unwrap_or_default();
        tracing::warn!(%status, what, "remote request rejected");
        Err(StoreError::Remote(format!("{} -> {}: {}", what, status, body)))
    }

    fn select<T: DeserializeOwned>(&self, table: &str) -> StoreResult<Vec<T>> {
        let mut url = format!("{}?select=*", self.url(table, None));
        if let Some(uid) = &self.cfg.user_id {
            url.push_str(&format!("&user_id=eq.{}", uid));
        }
        let resp = self.authed(self.client.get(&url)).send()?;
        let resp = self.check(&format!("GET {}", table), resp)?;
        Ok(resp.json::<Vec<T>>()?)
    }

    fn upsert<T: Serialize>(&self, table: &str, row: &T) -> StoreResult<()> {
        let resp = self
            .authed(self.client.post(self.url(table, None)))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(row)
            .send()?;
        self.check(&format!("UPSERT {}", table), resp)?;
        Ok(())
    }

    fn insert<T: Serialize>(&self, table: &str, row: &T) -> StoreResult<()> {
        let resp = self
            .authed(self.client.post(self.url(table, None)))
            .header("Prefer", "return=minimal")
            .json(row)
            .send()?;
        self.check(&format!("INSERT {}", table), resp)?;
        Ok(())
    }

    fn patch<T: Serialize>(&self, table: &str, id: &str, body: &T) -> StoreResult<()> {
        let resp = self
            .authed(self.client.patch(self.url(table, Some(id))))
            .header("Prefer", "return=minimal")
            .json(body)
            .send()?;
        self.check(&format!("PATCH {}/{}", table, id), resp)?;
        Ok(())
    }

    fn delete(&self, table: &str, id: &str) -> StoreResult<()> {
        let resp = self
            .authed(self.client.delete(self.url(table, Some(id))))
            .send()?;
        self.check(&format!("DELETE {}/{}", table, id), resp)?;
        Ok(())
    }

    fn user_id(&self) -> Option<&str> {
        self.cfg.user_id.as_deref()
    }
}

impl Repository for RestRepository {
    fn name(&self) -> &str {
        "rest"
    }

    fn stores_opening_balance(&self) -> bool {
        false
    }

    fn fetch_accounts(&self) -> StoreResult<Vec<Account>> {
        let rows: Vec<AccountRow> = self.select("accounts")?;
        Ok(rows.into_iter().map(Account::from).collect())
    }

    fn fetch_transactions(&self) -> StoreResult<Vec<Transaction>> {
        let rows: Vec<TransactionRow> = self.select("transactions")?;
        let mut out: Vec<Transaction> = rows.into_iter().map(Transaction::from).collect();
        out.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(out)
    }

    fn fetch_categories(&self) -> StoreResult<Vec<Category>> {
        let rows: Vec<CategoryRow> = self.select("categories")?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    fn upsert_account(&self, account: &Account) -> StoreResult<()> {
        self.upsert("accounts", &AccountRow::from_account(account, self.user_id()))
    }

    fn delete_account(&self, id: &str) -> StoreResult<()> {
        self.delete("accounts", id)
    }

    fn set_balance(&self, account_id: &str, balance: Decimal) -> StoreResult<()> {
        self.patch("accounts", account_id, &json!({ "balance": balance }))
    }

    fn insert_transaction(&self, tx: &Transaction) -> StoreResult<()> {
        self.insert(
            "transactions",
            &TransactionRow::from_transaction(tx, self.user_id()),
        )
    }

    fn update_transaction(&self, tx: &Transaction) -> StoreResult<()> {
        let row = TransactionRow::from_transaction(tx, None);
        self.patch("transactions", &tx.id, &row)
    }

    fn delete_transaction(&self, id: &str) -> StoreResult<()> {
        self.delete("transactions", id)
    }

    fn upsert_category(&self, category: &Category) -> StoreResult<()> {
        self.upsert(
            "categories",
            &CategoryRow::from_category(category, self.user_id()),
        )
    }

    fn delete_category(&self, id: &str) -> StoreResult<()> {
        self.delete("categories", id)
    }
}
