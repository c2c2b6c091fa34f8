// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::repository::Repository;
use crate::store::Store;
use crate::utils::pretty_table;
use anyhow::{Result, bail};

pub fn handle<R: Repository>(store: &mut Store<R>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("status", _)) => {
            println!(
                "Backend: {}  Policy: {}  Pending: {}",
                store.repository().name(),
                store.policy(),
                store.pending().len()
            );
            if !store.pending().is_empty() {
                let rows = store
                    .pending()
                    .iter()
                    .enumerate()
                    .map(|(i, m)| vec![(i + 1).to_string(), m.describe()])
                    .collect();
                println!("{}", pretty_table(&["#", "Write"], rows));
            }
        }
        Some(("push", _)) => {
            let report = store.flush_pending();
            match report.error {
                None => println!("Sent {} queued write(s)", report.sent),
                Some(e) => println!(
                    "Sent {}, {} still queued: {}",
                    report.sent, report.remaining, e
                ),
            }
        }
        Some(("drop", sub)) => {
            let n = *sub.get_one::<usize>("index").unwrap();
            if n == 0 {
                bail!("Queued writes are numbered from 1");
            }
            let removed = store.discard_pending(n - 1)?;
            println!(
                "Discarded '{}', {} write(s) still queued",
                removed.describe(),
                store.pending().len()
            );
        }
        _ => {}
    }
    Ok(())
}
