// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use moneyflow::models::{Category, CategoryKind, Transaction, TransactionType};
use moneyflow::reports;
use rust_decimal::Decimal;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn tx(date: NaiveDate, r#type: TransactionType, amount: &str, category: &str) -> Transaction {
    Transaction {
        id: format!("{}-{}-{}", date, category, amount),
        date,
        description: category.to_string(),
        amount: amount.parse().unwrap(),
        r#type,
        category: category.to_string(),
        account_id: "a".into(),
        to_account_id: (r#type == TransactionType::Transfer).then(|| "b".to_string()),
    }
}

fn sample() -> Vec<Transaction> {
    vec![
        tx(day(2025, 3, 28), TransactionType::Expense, "40", "Food & Dining"),
        tx(day(2025, 3, 15), TransactionType::Transfer, "500", "Transfer"),
        tx(day(2025, 3, 12), TransactionType::Expense, "60", "Shopping"),
        tx(day(2025, 3, 1), TransactionType::Income, "3000", "Salary"),
        tx(day(2025, 3, 1), TransactionType::Expense, "10", "Food & Dining"),
        tx(day(2025, 2, 20), TransactionType::Income, "1000", "Freelance"),
        tx(day(2025, 1, 5), TransactionType::Expense, "25.50", "Shopping"),
    ]
}

#[test]
fn monthly_summary_ignores_transfers() {
    let s = reports::monthly_summary(&sample(), day(2025, 3, 1));
    assert_eq!(s.month, "2025-03");
    assert_eq!(s.income, Decimal::from(3000));
    assert_eq!(s.expense, Decimal::from(110));
    assert_eq!(s.savings, Decimal::from(2890));
}

#[test]
fn trend_is_oldest_first_and_includes_empty_months() {
    let rows = reports::trend(&sample(), day(2025, 3, 20), 4);
    let months: Vec<&str> = rows.iter().map(|r| r.month.as_str()).collect();
    assert_eq!(months, ["2024-12", "2025-01", "2025-02", "2025-03"]);
    assert_eq!(rows[0].income, Decimal::ZERO);
    assert_eq!(rows[1].expense, "25.50".parse::<Decimal>().unwrap());
    assert_eq!(rows[2].savings, Decimal::from(1000));
}

#[test]
fn spending_by_category_applies_budgets() {
    let mut food = Category::new("Food & Dining", CategoryKind::Expense, "#ef4444");
    food.budget = Some(Decimal::from(45));
    let cats = vec![food, Category::new("Shopping", CategoryKind::Expense, "#8b5cf6")];

    let rows = reports::spending_by_category(&sample(), &cats, day(2025, 3, 1));
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].category, "Shopping");
    assert_eq!(rows[0].spent, Decimal::from(60));
    assert_eq!(rows[0].budget, None);
    assert_eq!(rows[1].category, "Food & Dining");
    assert_eq!(rows[1].spent, Decimal::from(50));
    assert_eq!(rows[1].remaining, Some(Decimal::from(-5)));
}

#[test]
fn category_stats_report_shares() {
    let stats = reports::category_stats(&sample());
    assert_eq!(stats.total_income, Decimal::from(4000));
    assert_eq!(stats.income[0].category, "Salary");
    assert_eq!(stats.income[0].percentage, Decimal::from(75));
    assert_eq!(stats.income[1].percentage, Decimal::from(25));
    assert!(stats.expense.iter().all(|s| s.category != "Transfer"));
    assert_eq!(stats.total_expense, "135.50".parse::<Decimal>().unwrap());
}

#[test]
fn category_stats_on_empty_ledger() {
    let stats = reports::category_stats(&[]);
    assert!(stats.income.is_empty() && stats.expense.is_empty());
    assert_eq!(stats.total_income, Decimal::ZERO);
}

#[test]
fn daily_cash_flow_covers_window_inclusive() {
    let rows = reports::daily_cash_flow(&sample(), day(2025, 3, 28), 27);
    assert_eq!(rows.len(), 28);
    assert_eq!(rows[0].date, day(2025, 3, 1));
    assert_eq!(rows[0].income, Decimal::from(3000));
    assert_eq!(rows[0].net, Decimal::from(2990));
    assert_eq!(rows.last().unwrap().expense, Decimal::from(40));
    // the transfer day shows no flow
    assert_eq!(rows[14].date, day(2025, 3, 15));
    assert_eq!(rows[14].net, Decimal::ZERO);
}

#[test]
fn account_activity_includes_incoming_transfers() {
    let txs = sample();
    assert_eq!(reports::account_activity(&txs, "a").len(), txs.len());
    let incoming = reports::account_activity(&txs, "b");
    assert_eq!(incoming.len(), 1);
    assert_eq!(incoming[0].r#type, TransactionType::Transfer);
}
