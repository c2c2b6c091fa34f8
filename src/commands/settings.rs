// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Theme;
use crate::utils::{get_settings, pretty_table, save_settings};
use anyhow::{Result, bail};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", _)) => {
            let s = get_settings(conn)?;
            println!(
                "{}",
                pretty_table(
                    &["Setting", "Value"],
                    vec![
                        vec!["currency".into(), s.currency],
                        vec!["theme".into(), s.theme.to_string()],
                    ],
                )
            );
        }
        Some(("set", sub)) => {
            let mut s = get_settings(conn)?;
            if let Some(ccy) = sub.get_one::<String>("currency") {
                let ccy = ccy.trim().to_uppercase();
                if ccy.len() != 3 || !ccy.chars().all(|c| c.is_ascii_alphabetic()) {
                    bail!("Currency must be a 3-letter code, got '{}'", ccy);
                }
                s.currency = ccy;
            }
            if let Some(theme) = sub.get_one::<String>("theme") {
                s.theme = theme.parse::<Theme>()?;
            }
            save_settings(conn, &s)?;
            println!("Settings saved: currency={} theme={}", s.currency, s.theme);
        }
        _ => {}
    }
    Ok(())
}
