// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by the ledger, the store and the repositories behind it.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Account '{0}' not found")]
    AccountNotFound(String),

    #[error("Transaction '{0}' not found")]
    TransactionNotFound(String),

    #[error("Category '{0}' not found")]
    CategoryNotFound(String),

    #[error("Duplicate id '{0}'")]
    DuplicateId(String),

    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error(
        "Insufficient funds in account '{account}': available {available}, requested {requested}"
    )]
    InsufficientFunds {
        account: String,
        available: Decimal,
        requested: Decimal,
    },

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Remote write failed: {0}")]
    Remote(String),

    #[error("Corrupt stored value: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
