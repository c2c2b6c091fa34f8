// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger;
use crate::repository::Repository;
use crate::store::Store;
use crate::utils::pretty_table;
use anyhow::Result;
use std::collections::HashSet;

/// Issues found in the loaded store, as `[issue, detail]` rows.
pub fn check<R: Repository>(store: &Store<R>) -> Vec<Vec<String>> {
    let mut rows = Vec::new();

    for d in ledger::drift(store.accounts(), store.transactions()) {
        rows.push(vec![
            "balance_drift".into(),
            format!(
                "{}: cached {} vs ledger {} (off by {})",
                d.account,
                d.actual,
                d.expected,
                d.delta()
            ),
        ]);
    }

    for t in store.transactions() {
        for id in std::iter::once(&t.account_id).chain(t.to_account_id.as_ref()) {
            if store.account(id).is_none() {
                rows.push(vec![
                    "dangling_account".into(),
                    format!("{} '{}' -> {}", t.date, t.description, id),
                ]);
            }
        }
    }

    let known: HashSet<String> = store
        .categories()
        .iter()
        .map(|c| c.name.to_lowercase())
        .collect();
    let mut unknown: Vec<&str> = store
        .transactions()
        .iter()
        .filter(|t| !known.contains(&t.category.to_lowercase()))
        .map(|t| t.category.as_str())
        .collect();
    unknown.sort_unstable();
    unknown.dedup();
    for c in unknown {
        rows.push(vec!["unknown_category".into(), c.to_string()]);
    }

    if !store.pending().is_empty() {
        rows.push(vec![
            "pending_writes".into(),
            format!("{} write(s) not yet sent", store.pending().len()),
        ]);
    }
    rows
}

pub fn handle<R: Repository>(store: &Store<R>) -> Result<()> {
    let rows = check(store);
    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
