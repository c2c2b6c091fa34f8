// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod accounts;
pub mod categories;
pub mod transactions;
pub mod reports;
pub mod settings;
pub mod sync;
pub mod exporter;
pub mod doctor;

use crate::store::WriteOutcome;

/// Prints the result of a write; `done` describes the local change.
pub fn print_outcome(done: &str, outcome: &WriteOutcome) {
    match outcome {
        WriteOutcome::Synced => println!("{}", done),
        WriteOutcome::RolledBack { error } => {
            println!("Not saved, backend rejected the change: {}", error)
        }
        WriteOutcome::Queued { pending } => println!(
            "{} (offline: {} write(s) queued, run `moneyflow sync push`)",
            done, pending
        ),
    }
}
