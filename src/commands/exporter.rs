// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::repository::Repository;
use crate::store::Store;
use anyhow::{Result, bail};
use serde_json::json;

pub fn handle<R: Repository>(store: &Store<R>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(store, sub),
        _ => Ok(()),
    }
}

fn export_transactions<R: Repository>(store: &Store<R>, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();

    let name = |id: &str| {
        store
            .account(id)
            .map(|a| a.name.clone())
            .unwrap_or_default()
    };
    // Oldest first, the order a spreadsheet expects.
    let txs = store.transactions().iter().rev();

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "id",
                "date",
                "description",
                "type",
                "amount",
                "category",
                "account",
                "to_account",
            ])?;
            for t in txs {
                wtr.write_record([
                    t.id.clone(),
                    t.date.to_string(),
                    t.description.clone(),
                    t.r#type.to_string(),
                    t.amount.to_string(),
                    t.category.clone(),
                    name(&t.account_id),
                    t.to_account_id.as_deref().map(name).unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let items: Vec<_> = txs
                .map(|t| {
                    json!({
                        "id": t.id,
                        "date": t.date.to_string(),
                        "description": t.description,
                        "type": t.r#type,
                        "amount": t.amount.to_string(),
                        "category": t.category,
                        "account": name(&t.account_id),
                        "to_account": t.to_account_id.as_deref().map(name),
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        _ => bail!("Unknown format: {} (use csv|json)", fmt),
    }
    println!("Exported {} transaction(s) to {}", store.transactions().len(), out);
    Ok(())
}
