// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Transaction;
use crate::reports::{self, MonthlySummary};
use crate::repository::Repository;
use crate::store::Store;
use crate::utils::{fmt_money, maybe_print_json, months_back, parse_month, pretty_table};
use anyhow::Result;
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle<R: Repository>(store: &Store<R>, ccy: &str, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("dashboard", sub)) => dashboard(store, ccy, sub)?,
        Some(("trend", sub)) => trend(store, sub)?,
        Some(("spending", sub)) => spending(store, sub)?,
        Some(("categories", sub)) => categories(store, sub)?,
        Some(("daily", sub)) => daily(store, sub)?,
        Some(("account", sub)) => account(store, ccy, sub)?,
        _ => {}
    }
    Ok(())
}

fn month_arg(sub: &clap::ArgMatches) -> Result<NaiveDate> {
    match sub.get_one::<String>("month") {
        Some(m) => parse_month(m),
        None => Ok(months_back(Local::now().date_naive(), 0)),
    }
}

#[derive(Serialize)]
struct Dashboard<'a> {
    net_worth: Decimal,
    month: MonthlySummary,
    recent: Vec<&'a Transaction>,
}

fn dashboard<R: Repository>(store: &Store<R>, ccy: &str, sub: &clap::ArgMatches) -> Result<()> {
    let month = month_arg(sub)?;
    let data = Dashboard {
        net_worth: reports::net_worth(store.accounts()),
        month: reports::monthly_summary(store.transactions(), month),
        recent: store.transactions().iter().take(5).collect(),
    };
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    println!(
        "{}",
        pretty_table(
            &["Net worth", "Income", "Expense", "Savings"],
            vec![vec![
                fmt_money(&data.net_worth, ccy),
                fmt_money(&data.month.income, ccy),
                fmt_money(&data.month.expense, ccy),
                fmt_money(&data.month.savings, ccy),
            ]],
        )
    );
    println!("Month: {}", data.month.month);
    let rows = data
        .recent
        .iter()
        .map(|t| {
            vec![
                t.date.to_string(),
                t.description.clone(),
                t.r#type.to_string(),
                format!("{:.2}", t.amount),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Date", "Recent", "Type", "Amount"], rows));
    Ok(())
}

fn trend<R: Repository>(store: &Store<R>, sub: &clap::ArgMatches) -> Result<()> {
    let months = *sub.get_one::<u32>("months").unwrap_or(&6);
    let data = reports::trend(store.transactions(), Local::now().date_naive(), months);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|m| {
                vec![
                    m.month.clone(),
                    format!("{:.2}", m.income),
                    format!("{:.2}", m.expense),
                    format!("{:.2}", m.savings),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Month", "Income", "Expense", "Savings"], rows)
        );
    }
    Ok(())
}

fn spending<R: Repository>(store: &Store<R>, sub: &clap::ArgMatches) -> Result<()> {
    let month = month_arg(sub)?;
    let data = reports::spending_by_category(store.transactions(), store.categories(), month);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|c| {
                vec![
                    c.category.clone(),
                    format!("{:.2}", c.spent),
                    c.budget.map(|b| format!("{:.2}", b)).unwrap_or_default(),
                    c.remaining.map(|r| format!("{:.2}", r)).unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Category", "Spent", "Budget", "Remaining"], rows)
        );
    }
    Ok(())
}

fn categories<R: Repository>(store: &Store<R>, sub: &clap::ArgMatches) -> Result<()> {
    let data = reports::category_stats(store.transactions());
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    let rows = data
        .income
        .iter()
        .map(|s| ("income", s))
        .chain(data.expense.iter().map(|s| ("expense", s)))
        .map(|(kind, s)| {
            vec![
                kind.to_string(),
                s.category.clone(),
                format!("{:.2}", s.total),
                format!("{}%", s.percentage),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Kind", "Category", "Total", "Share"], rows));
    println!(
        "Total income {:.2}, total expense {:.2}",
        data.total_income, data.total_expense
    );
    Ok(())
}

fn daily<R: Repository>(store: &Store<R>, sub: &clap::ArgMatches) -> Result<()> {
    let days = *sub.get_one::<i64>("days").unwrap_or(&30);
    let data = reports::daily_cash_flow(store.transactions(), Local::now().date_naive(), days);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|d| {
                vec![
                    d.date.to_string(),
                    format!("{:.2}", d.income),
                    format!("{:.2}", d.expense),
                    format!("{:.2}", d.net),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Date", "Income", "Expense", "Net"], rows));
    }
    Ok(())
}

fn account<R: Repository>(store: &Store<R>, ccy: &str, sub: &clap::ArgMatches) -> Result<()> {
    let acct = store.find_account(sub.get_one::<String>("account").unwrap())?;
    let data = reports::account_activity(store.transactions(), &acct.id);
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    let rows = data
        .iter()
        .map(|t| {
            let effect = crate::ledger::signed_effect(t, &acct.id);
            vec![
                t.date.to_string(),
                t.description.clone(),
                t.r#type.to_string(),
                format!("{:+.2}", effect),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Date", "Description", "Type", "Effect"], rows));
    println!("{} balance: {}", acct.name, fmt_money(&acct.balance, ccy));
    Ok(())
}
