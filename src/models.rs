// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{StoreError, StoreResult};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Cash,
    Bank,
    Credit,
    Investment,
    Other,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Cash => "cash",
            AccountType::Bank => "bank",
            AccountType::Credit => "credit",
            AccountType::Investment => "investment",
            AccountType::Other => "other",
        }
    }
}

impl FromStr for AccountType {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(AccountType::Cash),
            "bank" => Ok(AccountType::Bank),
            "credit" => Ok(AccountType::Credit),
            "investment" => Ok(AccountType::Investment),
            "other" => Ok(AccountType::Other),
            other => Err(StoreError::InvalidValue(format!("unknown account type '{}'", other))),
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
    Transfer,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
            TransactionType::Transfer => "transfer",
        }
    }
}

impl FromStr for TransactionType {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            "transfer" => Ok(TransactionType::Transfer),
            other => Err(StoreError::InvalidTransaction(format!(
                "unknown transaction type '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    Income,
    Expense,
}

impl CategoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKind::Income => "income",
            CategoryKind::Expense => "expense",
        }
    }
}

impl FromStr for CategoryKind {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(CategoryKind::Income),
            "expense" => Ok(CategoryKind::Expense),
            other => Err(StoreError::InvalidValue(format!("unknown category kind '{}'", other))),
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    pub r#type: AccountType,
    pub balance: Decimal,
    pub color: String,
    /// Balance before any live transaction touched the account. Local only.
    pub opening_balance: Decimal,
}

impl Account {
    pub fn new(name: &str, r#type: AccountType, balance: Decimal, color: &str) -> Self {
        Self {
            id: new_id(),
            name: name.to_string(),
            r#type,
            balance,
            color: color.to_string(),
            opening_balance: balance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub r#type: TransactionType,
    pub category: String,
    pub account_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_account_id: Option<String>,
}

impl Transaction {
    /// Checks the shape rules every stored transaction must satisfy.
    pub fn validate(&self) -> StoreResult<()> {
        if self.description.trim().is_empty() {
            return Err(StoreError::InvalidTransaction(
                "description is required".into(),
            ));
        }
        if self.category.trim().is_empty() {
            return Err(StoreError::InvalidTransaction("category is required".into()));
        }
        if self.amount <= Decimal::ZERO {
            return Err(StoreError::InvalidTransaction(format!(
                "amount must be positive, got {}",
                self.amount
            )));
        }
        match (self.r#type, self.to_account_id.as_deref()) {
            (TransactionType::Transfer, None) => Err(StoreError::InvalidTransaction(
                "transfer requires a destination account".into(),
            )),
            (TransactionType::Transfer, Some(to)) if to == self.account_id => {
                Err(StoreError::InvalidTransaction(
                    "transfer requires a different destination account".into(),
                ))
            }
            (TransactionType::Income | TransactionType::Expense, Some(_)) => {
                Err(StoreError::InvalidTransaction(format!(
                    "{} cannot have a destination account",
                    self.r#type
                )))
            }
            _ => Ok(()),
        }
    }

    /// True when the transaction moves money in or out of `account_id`.
    pub fn touches(&self, account_id: &str) -> bool {
        self.account_id == account_id || self.to_account_id.as_deref() == Some(account_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub kind: CategoryKind,
    pub color: String,
    /// Monthly budget, local only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<Decimal>,
}

impl Category {
    pub fn new(name: &str, kind: CategoryKind, color: &str) -> Self {
        Self {
            id: new_id(),
            name: name.to_string(),
            kind,
            color: color.to_string(),
            budget: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
    System,
}

impl FromStr for Theme {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            "system" => Ok(Theme::System),
            other => Err(StoreError::InvalidValue(format!("unknown theme '{}'", other))),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
            Theme::System => "system",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub currency: String,
    pub theme: Theme,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            theme: Theme::Dark,
        }
    }
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Categories a fresh or reset store starts with.
pub fn default_categories() -> Vec<Category> {
    let seed = [
        ("1", "Food & Dining", CategoryKind::Expense, "#ef4444"),
        ("2", "Transportation", CategoryKind::Expense, "#f97316"),
        ("3", "Shopping", CategoryKind::Expense, "#8b5cf6"),
        ("4", "Entertainment", CategoryKind::Expense, "#ec4899"),
        ("5", "Bills & Utilities", CategoryKind::Expense, "#3b82f6"),
        ("6", "Salary", CategoryKind::Income, "#10b981"),
        ("7", "Freelance", CategoryKind::Income, "#06b6d4"),
        ("8", "Investment", CategoryKind::Income, "#84cc16"),
    ];
    seed.iter()
        .map(|(id, name, kind, color)| Category {
            id: id.to_string(),
            name: name.to_string(),
            kind: *kind,
            color: color.to_string(),
            budget: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(r#type: TransactionType, to: Option<&str>) -> Transaction {
        Transaction {
            id: "t1".into(),
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            description: "Rent".into(),
            amount: Decimal::new(1000, 0),
            r#type,
            category: "Bills & Utilities".into(),
            account_id: "a".into(),
            to_account_id: to.map(|s| s.to_string()),
        }
    }

    #[test]
    fn destination_present_only_for_transfers() {
        assert!(tx(TransactionType::Expense, None).validate().is_ok());
        assert!(tx(TransactionType::Transfer, Some("b")).validate().is_ok());
        assert!(tx(TransactionType::Transfer, None).validate().is_err());
        assert!(tx(TransactionType::Transfer, Some("a")).validate().is_err());
        assert!(tx(TransactionType::Income, Some("b")).validate().is_err());
    }

    #[test]
    fn rejects_non_positive_amounts() {
        let mut t = tx(TransactionType::Income, None);
        t.amount = Decimal::ZERO;
        assert!(t.validate().is_err());
    }

    #[test]
    fn local_json_uses_camel_case() {
        let v = serde_json::to_value(tx(TransactionType::Transfer, Some("b"))).unwrap();
        assert_eq!(v["accountId"], "a");
        assert_eq!(v["toAccountId"], "b");
        assert_eq!(v["type"], "transfer");
    }
}
