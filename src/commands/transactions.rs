// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::print_outcome;
use crate::ledger::ensure_sufficient_funds;
use crate::models::{Transaction, TransactionType, new_id};
use crate::repository::Repository;
use crate::store::Store;
use crate::utils::{maybe_print_json, parse_date, parse_decimal, parse_month, pretty_table};
use anyhow::Result;
use chrono::{Datelike, Local};
use serde::Serialize;

pub fn handle<R: Repository>(store: &mut Store<R>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(store, sub)?,
        Some(("edit", sub)) => edit(store, sub)?,
        Some(("rm", sub)) => rm(store, sub)?,
        Some(("list", sub)) => list(store, sub)?,
        _ => {}
    }
    Ok(())
}

fn add<R: Repository>(store: &mut Store<R>, sub: &clap::ArgMatches) -> Result<()> {
    let date = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?,
        None => Local::now().date_naive(),
    };
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let r#type = sub.get_one::<String>("type").unwrap().parse::<TransactionType>()?;
    let account = store.find_account(sub.get_one::<String>("account").unwrap())?;
    let to_account_id = sub
        .get_one::<String>("to")
        .map(|k| store.find_account(k).map(|a| a.id.clone()))
        .transpose()?;

    let tx = Transaction {
        id: new_id(),
        date,
        description: sub.get_one::<String>("description").unwrap().trim().to_string(),
        amount,
        r#type,
        category: sub.get_one::<String>("category").unwrap().trim().to_string(),
        account_id: account.id.clone(),
        to_account_id,
    };
    tx.validate()?;
    if !sub.get_flag("force") {
        ensure_sufficient_funds(account, &tx, None)?;
    }
    let summary = format!(
        "Recorded {} {} on {} '{}' (acct: {})",
        tx.r#type, tx.amount, tx.date, tx.description, account.name
    );
    let short = tx.id[..8].to_string();
    let outcome = store.add_transaction(tx)?;
    print_outcome(&format!("{} [{}]", summary, short), &outcome);
    Ok(())
}

fn edit<R: Repository>(store: &mut Store<R>, sub: &clap::ArgMatches) -> Result<()> {
    let old = store
        .find_transaction(sub.get_one::<String>("id").unwrap())?
        .clone();
    let mut tx = old.clone();
    if let Some(d) = sub.get_one::<String>("date") {
        tx.date = parse_date(d)?;
    }
    if let Some(d) = sub.get_one::<String>("description") {
        tx.description = d.trim().to_string();
    }
    if let Some(a) = sub.get_one::<String>("amount") {
        tx.amount = parse_decimal(a)?;
    }
    if let Some(t) = sub.get_one::<String>("type") {
        tx.r#type = t.parse::<TransactionType>()?;
        if tx.r#type != TransactionType::Transfer {
            tx.to_account_id = None;
        }
    }
    if let Some(c) = sub.get_one::<String>("category") {
        tx.category = c.trim().to_string();
    }
    if let Some(k) = sub.get_one::<String>("account") {
        tx.account_id = store.find_account(k)?.id.clone();
    }
    if let Some(k) = sub.get_one::<String>("to") {
        tx.to_account_id = Some(store.find_account(k)?.id.clone());
    }
    tx.validate()?;
    if !sub.get_flag("force") {
        let account = store.find_account(&tx.account_id)?;
        ensure_sufficient_funds(account, &tx, Some(&old))?;
    }
    let outcome = store.update_transaction(tx)?;
    print_outcome(&format!("Updated transaction '{}'", old.description), &outcome);
    Ok(())
}

fn rm<R: Repository>(store: &mut Store<R>, sub: &clap::ArgMatches) -> Result<()> {
    let tx = store
        .find_transaction(sub.get_one::<String>("id").unwrap())?
        .clone();
    let outcome = store.delete_transaction(&tx.id)?;
    print_outcome(
        &format!("Removed {} {} '{}'", tx.r#type, tx.amount, tx.description),
        &outcome,
    );
    Ok(())
}

fn list<R: Repository>(store: &Store<R>, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(store, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id[..r.id.len().min(8)].to_string(),
                    r.date.clone(),
                    r.description.clone(),
                    r.r#type.clone(),
                    r.amount.clone(),
                    r.category.clone(),
                    match &r.to_account {
                        Some(to) => format!("{} -> {}", r.account, to),
                        None => r.account.clone(),
                    },
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Date", "Description", "Type", "Amount", "Category", "Account"],
                rows,
            )
        );
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct TransactionRow {
    pub id: String,
    pub date: String,
    pub description: String,
    pub r#type: String,
    pub amount: String,
    pub category: String,
    pub account: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_account: Option<String>,
}

/// Transactions matching the `list` filters, newest first.
pub fn query_rows<R: Repository>(
    store: &Store<R>,
    sub: &clap::ArgMatches,
) -> Result<Vec<TransactionRow>> {
    let r#type = sub
        .get_one::<String>("type")
        .map(|s| s.parse::<TransactionType>())
        .transpose()?;
    let month = sub
        .get_one::<String>("month")
        .map(|s| parse_month(s))
        .transpose()?;
    let account_id = sub
        .get_one::<String>("account")
        .map(|k| store.find_account(k).map(|a| a.id.clone()))
        .transpose()?;
    let category = sub.get_one::<String>("category").map(|s| s.trim());
    let limit = sub.get_one::<usize>("limit").copied().unwrap_or(usize::MAX);

    let account_name = |id: &str| {
        store
            .account(id)
            .map(|a| a.name.clone())
            .unwrap_or_else(|| format!("<missing {}>", id))
    };

    let data = store
        .transactions()
        .iter()
        .filter(|t| r#type.is_none_or(|ty| t.r#type == ty))
        .filter(|t| {
            month.is_none_or(|m| t.date.year() == m.year() && t.date.month() == m.month())
        })
        .filter(|t| account_id.as_deref().is_none_or(|id| t.touches(id)))
        .filter(|t| category.is_none_or(|c| t.category.eq_ignore_ascii_case(c)))
        .take(limit)
        .map(|t| TransactionRow {
            id: t.id.clone(),
            date: t.date.to_string(),
            description: t.description.clone(),
            r#type: t.r#type.to_string(),
            amount: format!("{:.2}", t.amount),
            category: t.category.clone(),
            account: account_name(&t.account_id),
            to_account: t.to_account_id.as_deref().map(account_name),
        })
        .collect();
    Ok(data)
}
