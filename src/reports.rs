// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Dashboard and report aggregates. Transfers move money between the user's
//! own accounts and never count as income or expense.

use crate::models::{Account, Category, CategoryKind, Transaction, TransactionType};
use crate::utils::months_back;
use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySummary {
    pub month: String,
    pub income: Decimal,
    pub expense: Decimal,
    pub savings: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySpend {
    pub category: String,
    pub spent: Decimal,
    pub budget: Option<Decimal>,
    pub remaining: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: String,
    pub total: Decimal,
    pub percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStats {
    pub income: Vec<CategoryShare>,
    pub expense: Vec<CategoryShare>,
    pub total_income: Decimal,
    pub total_expense: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyFlow {
    pub date: NaiveDate,
    pub income: Decimal,
    pub expense: Decimal,
    pub net: Decimal,
}

fn in_month(d: NaiveDate, month_start: NaiveDate) -> bool {
    d.year() == month_start.year() && d.month() == month_start.month()
}

fn totals<'a>(txs: impl Iterator<Item = &'a Transaction>) -> (Decimal, Decimal) {
    txs.fold((Decimal::ZERO, Decimal::ZERO), |(inc, exp), t| match t.r#type {
        TransactionType::Income => (inc + t.amount, exp),
        TransactionType::Expense => (inc, exp + t.amount),
        TransactionType::Transfer => (inc, exp),
    })
}

pub fn net_worth(accounts: &[Account]) -> Decimal {
    accounts.iter().map(|a| a.balance).sum()
}

pub fn monthly_summary(txs: &[Transaction], month_start: NaiveDate) -> MonthlySummary {
    let (income, expense) = totals(txs.iter().filter(|t| in_month(t.date, month_start)));
    MonthlySummary {
        month: month_start.format("%Y-%m").to_string(),
        income,
        expense,
        savings: income - expense,
    }
}

/// Income vs expense for the `months` months ending with the month of
/// `today`, oldest first.
pub fn trend(txs: &[Transaction], today: NaiveDate, months: u32) -> Vec<MonthlySummary> {
    (0..months)
        .rev()
        .map(|i| monthly_summary(txs, months_back(today, i)))
        .collect()
}

/// Expense totals per category label for one month, largest first.
pub fn spending_by_category(
    txs: &[Transaction],
    categories: &[Category],
    month_start: NaiveDate,
) -> Vec<CategorySpend> {
    let mut agg: BTreeMap<&str, Decimal> = BTreeMap::new();
    for t in txs
        .iter()
        .filter(|t| t.r#type == TransactionType::Expense && in_month(t.date, month_start))
    {
        *agg.entry(t.category.as_str()).or_insert(Decimal::ZERO) += t.amount;
    }
    let mut out: Vec<CategorySpend> = agg
        .into_iter()
        .map(|(name, spent)| {
            let budget = categories
                .iter()
                .find(|c| c.kind == CategoryKind::Expense && c.name == name)
                .and_then(|c| c.budget);
            CategorySpend {
                category: name.to_string(),
                spent,
                budget,
                remaining: budget.map(|b| b - spent),
            }
        })
        .collect();
    out.sort_by(|a, b| b.spent.cmp(&a.spent));
    out
}

fn shares(map: BTreeMap<&str, Decimal>, total: Decimal) -> Vec<CategoryShare> {
    let hundred = Decimal::ONE_HUNDRED;
    let mut out: Vec<CategoryShare> = map
        .into_iter()
        .map(|(name, value)| CategoryShare {
            category: name.to_string(),
            total: value,
            percentage: if total > Decimal::ZERO {
                (value / total * hundred).round_dp(2)
            } else {
                Decimal::ZERO
            },
        })
        .collect();
    out.sort_by(|a, b| b.total.cmp(&a.total));
    out
}

/// Per-category income and expense totals over all transactions.
pub fn category_stats(txs: &[Transaction]) -> CategoryStats {
    let mut income: BTreeMap<&str, Decimal> = BTreeMap::new();
    let mut expense: BTreeMap<&str, Decimal> = BTreeMap::new();
    for t in txs {
        let map = match t.r#type {
            TransactionType::Income => &mut income,
            TransactionType::Expense => &mut expense,
            TransactionType::Transfer => continue,
        };
        *map.entry(t.category.as_str()).or_insert(Decimal::ZERO) += t.amount;
    }
    let total_income: Decimal = income.values().copied().sum();
    let total_expense: Decimal = expense.values().copied().sum();
    CategoryStats {
        income: shares(income, total_income),
        expense: shares(expense, total_expense),
        total_income,
        total_expense,
    }
}

/// One row per day from `today - days` through `today`, inclusive.
pub fn daily_cash_flow(txs: &[Transaction], today: NaiveDate, days: i64) -> Vec<DailyFlow> {
    let start = today - Duration::days(days);
    start
        .iter_days()
        .take_while(|d| *d <= today)
        .map(|day| {
            let (income, expense) = totals(txs.iter().filter(|t| t.date == day));
            DailyFlow {
                date: day,
                income,
                expense,
                net: income - expense,
            }
        })
        .collect()
}

/// Transactions where the account is the source or the transfer
/// destination, newest first.
pub fn account_activity<'a>(txs: &'a [Transaction], account_id: &str) -> Vec<&'a Transaction> {
    let mut out: Vec<&Transaction> = txs.iter().filter(|t| t.touches(account_id)).collect();
    out.sort_by(|a, b| b.date.cmp(&a.date));
    out
}
