// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::print_outcome;
use crate::models::{Account, AccountType};
use crate::repository::Repository;
use crate::store::{AccountPatch, Store};
use crate::utils::{fmt_money, maybe_print_json, parse_decimal, pretty_table};
use anyhow::Result;

pub fn handle<R: Repository>(store: &mut Store<R>, ccy: &str, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            let typ = sub.get_one::<String>("type").unwrap().parse::<AccountType>()?;
            let balance = parse_decimal(sub.get_one::<String>("balance").unwrap())?;
            let color = sub.get_one::<String>("color").unwrap();
            let account = Account::new(name.trim(), typ, balance, color);
            let outcome = store.add_account(account)?;
            print_outcome(
                &format!("Added account '{}' ({}, {})", name, typ, fmt_money(&balance, ccy)),
                &outcome,
            );
        }
        Some(("list", sub)) => {
            let accounts = store.accounts();
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &accounts)? {
                let rows = accounts
                    .iter()
                    .map(|a| {
                        vec![
                            a.name.clone(),
                            a.r#type.to_string(),
                            fmt_money(&a.balance, ccy),
                            a.id.clone(),
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["Name", "Type", "Balance", "Id"], rows));
                println!(
                    "Net worth: {}",
                    fmt_money(&crate::reports::net_worth(accounts), ccy)
                );
            }
        }
        Some(("edit", sub)) => {
            let key = sub.get_one::<String>("account").unwrap();
            let id = store.find_account(key)?.id.clone();
            let patch = AccountPatch {
                name: sub.get_one::<String>("name").map(|s| s.trim().to_string()),
                r#type: sub
                    .get_one::<String>("type")
                    .map(|s| s.parse::<AccountType>())
                    .transpose()?,
                balance: sub
                    .get_one::<String>("balance")
                    .map(|s| parse_decimal(s))
                    .transpose()?,
                color: sub.get_one::<String>("color").cloned(),
            };
            let outcome = store.update_account(&id, patch)?;
            print_outcome(&format!("Updated account '{}'", key), &outcome);
        }
        Some(("rm", sub)) => {
            let key = sub.get_one::<String>("account").unwrap();
            let account = store.find_account(key)?;
            let (id, name) = (account.id.clone(), account.name.clone());
            let removed = store.transactions().iter().filter(|t| t.touches(&id)).count();
            let outcome = store.delete_account(&id)?;
            print_outcome(
                &format!("Removed account '{}' and {} transaction(s)", name, removed),
                &outcome,
            );
        }
        _ => {}
    }
    Ok(())
}
