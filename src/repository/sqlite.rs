// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::Repository;
use crate::error::{StoreError, StoreResult};
use crate::models::{Account, Category, Transaction};
use chrono::NaiveDate;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;

/// Local SQLite backend. Decimals are stored as TEXT to keep exact values.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }
}

fn decimal(s: &str) -> StoreResult<Decimal> {
    s.parse::<Decimal>()
        .map_err(|e| StoreError::Corrupt(format!("decimal '{}': {}", s, e)))
}

impl Repository for SqliteRepository {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn fetch_accounts(&self) -> StoreResult<Vec<Account>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, type, balance, color, opening_balance FROM accounts ORDER BY rowid",
        )?;
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(r) = rows.next()? {
            let typ: String = r.get(2)?;
            let bal: String = r.get(3)?;
            let opening: String = r.get(5)?;
            out.push(Account {
                id: r.get(0)?,
                name: r.get(1)?,
                r#type: typ.parse()?,
                balance: decimal(&bal)?,
                color: r.get(4)?,
                opening_balance: decimal(&opening)?,
            });
        }
        Ok(out)
    }

    fn fetch_transactions(&self) -> StoreResult<Vec<Transaction>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date, description, amount, type, category, account_id, to_account_id
             FROM transactions ORDER BY date DESC, rowid DESC",
        )?;
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(r) = rows.next()? {
            let date: String = r.get(1)?;
            let amount: String = r.get(3)?;
            let typ: String = r.get(4)?;
            out.push(Transaction {
                id: r.get(0)?,
                date: NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                    .map_err(|e| StoreError::Corrupt(format!("date '{}': {}", date, e)))?,
                description: r.get(2)?,
                amount: decimal(&amount)?,
                r#type: typ.parse()?,
                category: r.get(5)?,
                account_id: r.get(6)?,
                to_account_id: r.get(7)?,
            });
        }
        Ok(out)
    }

    fn fetch_categories(&self) -> StoreResult<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, kind, color, budget FROM categories ORDER BY kind, name")?;
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(r) = rows.next()? {
            let kind: String = r.get(2)?;
            let budget: Option<String> = r.get(4)?;
            out.push(Category {
                id: r.get(0)?,
                name: r.get(1)?,
                kind: kind.parse()?,
                color: r.get(3)?,
                budget: budget.as_deref().map(decimal).transpose()?,
            });
        }
        Ok(out)
    }

    fn upsert_account(&self, a: &Account) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO accounts(id, name, type, balance, color, opening_balance)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                name=excluded.name, type=excluded.type, balance=excluded.balance,
                color=excluded.color, opening_balance=excluded.opening_balance",
            params![
                a.id,
                a.name,
                a.r#type.as_str(),
                a.balance.to_string(),
                a.color,
                a.opening_balance.to_string()
            ],
        )?;
        Ok(())
    }

    fn delete_account(&self, id: &str) -> StoreResult<()> {
        self.conn
            .execute("DELETE FROM accounts WHERE id=?1", params![id])?;
        Ok(())
    }

    fn set_balance(&self, account_id: &str, balance: Decimal) -> StoreResult<()> {
        let n = self.conn.execute(
            "UPDATE accounts SET balance=?1 WHERE id=?2",
            params![balance.to_string(), account_id],
        )?;
        if n == 0 {
            return Err(StoreError::AccountNotFound(account_id.to_string()));
        }
        Ok(())
    }

    fn insert_transaction(&self, t: &Transaction) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO transactions(id, date, description, amount, type, category, account_id, to_account_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                t.id,
                t.date.to_string(),
                t.description,
                t.amount.to_string(),
                t.r#type.as_str(),
                t.category,
                t.account_id,
                t.to_account_id
            ],
        )?;
        Ok(())
    }

    fn update_transaction(&self, t: &Transaction) -> StoreResult<()> {
        let n = self.conn.execute(
            "UPDATE transactions SET date=?2, description=?3, amount=?4, type=?5, category=?6,
                account_id=?7, to_account_id=?8
             WHERE id=?1",
            params![
                t.id,
                t.date.to_string(),
                t.description,
                t.amount.to_string(),
                t.r#type.as_str(),
                t.category,
                t.account_id,
                t.to_account_id
            ],
        )?;
        if n == 0 {
            return Err(StoreError::TransactionNotFound(t.id.clone()));
        }
        Ok(())
    }

    fn delete_transaction(&self, id: &str) -> StoreResult<()> {
        self.conn
            .execute("DELETE FROM transactions WHERE id=?1", params![id])?;
        Ok(())
    }

    fn upsert_category(&self, c: &Category) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO categories(id, name, kind, color, budget) VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                name=excluded.name, kind=excluded.kind, color=excluded.color, budget=excluded.budget",
            params![
                c.id,
                c.name,
                c.kind.as_str(),
                c.color,
                c.budget.map(|b| b.to_string())
            ],
        )?;
        Ok(())
    }

    fn delete_category(&self, id: &str) -> StoreResult<()> {
        self.conn
            .execute("DELETE FROM categories WHERE id=?1", params![id])?;
        Ok(())
    }
}
