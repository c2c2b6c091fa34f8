// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::print_outcome;
use crate::models::{Category, CategoryKind};
use crate::repository::Repository;
use crate::store::{CategoryPatch, Store};
use crate::utils::{maybe_print_json, parse_decimal, pretty_table};
use anyhow::Result;

pub fn handle<R: Repository>(store: &mut Store<R>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            let kind = sub.get_one::<String>("kind").unwrap().parse::<CategoryKind>()?;
            let color = sub.get_one::<String>("color").unwrap();
            let mut category = Category::new(name, kind, color);
            category.budget = sub
                .get_one::<String>("budget")
                .map(|s| parse_decimal(s))
                .transpose()?;
            let outcome = store.add_category(category)?;
            print_outcome(&format!("Added {} category '{}'", kind, name), &outcome);
        }
        Some(("list", sub)) => {
            let kind = sub
                .get_one::<String>("kind")
                .map(|s| s.parse::<CategoryKind>())
                .transpose()?;
            let data: Vec<&Category> = store
                .categories()
                .iter()
                .filter(|c| kind.is_none_or(|k| c.kind == k))
                .collect();
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|c| {
                        vec![
                            c.name.clone(),
                            c.kind.to_string(),
                            c.color.clone(),
                            c.budget.map(|b| format!("{:.2}", b)).unwrap_or_default(),
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["Name", "Kind", "Color", "Budget"], rows));
            }
        }
        Some(("edit", sub)) => {
            let key = sub.get_one::<String>("category").unwrap();
            let id = store.find_category(key)?.id.clone();
            let budget = if sub.get_flag("clear-budget") {
                Some(None)
            } else {
                sub.get_one::<String>("budget")
                    .map(|s| parse_decimal(s).map(Some))
                    .transpose()?
            };
            let patch = CategoryPatch {
                name: sub.get_one::<String>("name").map(|s| s.trim().to_string()),
                kind: sub
                    .get_one::<String>("kind")
                    .map(|s| s.parse::<CategoryKind>())
                    .transpose()?,
                color: sub.get_one::<String>("color").cloned(),
                budget,
            };
            let outcome = store.update_category(&id, patch)?;
            print_outcome(&format!("Updated category '{}'", key), &outcome);
        }
        Some(("rm", sub)) => {
            let key = sub.get_one::<String>("category").unwrap();
            let id = store.find_category(key)?.id.clone();
            let outcome = store.delete_category(&id)?;
            print_outcome(&format!("Removed category '{}'", key), &outcome);
        }
        _ => {}
    }
    Ok(())
}
