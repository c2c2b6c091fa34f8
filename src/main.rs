// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use moneyflow::config::{Backend, Config};
use moneyflow::repository::{Repository, RestRepository, SqliteRepository};
use moneyflow::store::{Store, WriteOutcome};
use moneyflow::{cli, commands, db, utils};

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let cfg = Config::load()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&cfg.logging.filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let db_path = cfg.db_path()?;
    let conn = db::open_or_init(&db_path)?;
    let repo: Box<dyn Repository> = match cfg.storage.backend {
        Backend::Sqlite => Box::new(SqliteRepository::new(db::open_or_init(&db_path)?)),
        Backend::Rest => Box::new(RestRepository::new(cfg.rest_config()?)?),
    };
    tracing::debug!(db = %db_path.display(), backend = repo.name(), "starting");

    let mut store = Store::new(repo, cfg.sync.policy);
    store.restore_pending(db::load_outbox(&conn)?);
    if !store.pending().is_empty() {
        store.flush_pending();
    }
    store.load()?;
    let ccy = utils::get_settings(&conn)?.currency;

    match matches.subcommand() {
        Some(("init", _)) => {
            match store.seed_default_categories() {
                Some(WriteOutcome::RolledBack { error }) => {
                    println!("Could not seed default categories: {}", error)
                }
                Some(outcome) => commands::print_outcome("Seeded default categories", &outcome),
                None => {}
            }
            println!("Database initialized at {}", db_path.display());
        }
        Some(("account", sub)) => commands::accounts::handle(&mut store, &ccy, sub)?,
        Some(("category", sub)) => commands::categories::handle(&mut store, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&mut store, sub)?,
        Some(("report", sub)) => commands::reports::handle(&store, &ccy, sub)?,
        Some(("settings", sub)) => commands::settings::handle(&conn, sub)?,
        Some(("sync", sub)) => commands::sync::handle(&mut store, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&store)?,
        Some(("export", sub)) => commands::exporter::handle(&store, sub)?,
        Some(("reset", _)) => {
            let outcome = store.reset();
            commands::print_outcome("Reset all data to defaults", &outcome);
        }
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }

    let pending: Vec<_> = store.pending().iter().cloned().collect();
    db::save_outbox(&conn, &pending)?;
    Ok(())
}
