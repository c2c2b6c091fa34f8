// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, command, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn opt(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help)
}

fn req(name: &'static str, help: &'static str) -> Arg {
    opt(name, help).required(true)
}

fn force() -> Arg {
    Arg::new("force")
        .long("force")
        .action(ArgAction::SetTrue)
        .help("Skip the insufficient-funds check")
}

pub fn build_cli() -> Command {
    command!()
        .name("moneyflow")
        .about("Personal finance ledger: accounts, transactions, categories and reports")
        .subcommand(Command::new("init").about("Create the local database and seed default categories"))
        .subcommand(
            Command::new("account")
                .about("Manage accounts")
                .subcommand(
                    Command::new("add")
                        .arg(req("name", "Account name"))
                        .arg(opt("type", "cash|bank|credit|investment|other").default_value("bank"))
                        .arg(opt("balance", "Starting balance").default_value("0"))
                        .arg(opt("color", "Display color").default_value("#3b82f6")),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(
                    Command::new("edit")
                        .arg(Arg::new("account").required(true).help("Account name or id"))
                        .arg(opt("name", "New name"))
                        .arg(opt("type", "cash|bank|credit|investment|other"))
                        .arg(opt("balance", "Set the balance directly"))
                        .arg(opt("color", "Display color")),
                )
                .subcommand(
                    Command::new("rm")
                        .arg(Arg::new("account").required(true).help("Account name or id")),
                ),
        )
        .subcommand(
            Command::new("category")
                .about("Manage categories")
                .subcommand(
                    Command::new("add")
                        .arg(req("name", "Category name"))
                        .arg(opt("kind", "income|expense").default_value("expense"))
                        .arg(opt("color", "Display color").default_value("#64748b"))
                        .arg(opt("budget", "Monthly budget")),
                )
                .subcommand(json_flags(
                    Command::new("list").arg(opt("kind", "income|expense")),
                ))
                .subcommand(
                    Command::new("edit")
                        .arg(Arg::new("category").required(true).help("Category name or id"))
                        .arg(opt("name", "New name"))
                        .arg(opt("kind", "income|expense"))
                        .arg(opt("color", "Display color"))
                        .arg(opt("budget", "Monthly budget"))
                        .arg(
                            Arg::new("clear-budget")
                                .long("clear-budget")
                                .action(ArgAction::SetTrue)
                                .conflicts_with("budget"),
                        ),
                )
                .subcommand(
                    Command::new("rm")
                        .arg(Arg::new("category").required(true).help("Category name or id")),
                ),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and edit transactions")
                .subcommand(
                    Command::new("add")
                        .arg(opt("date", "YYYY-MM-DD, defaults to today"))
                        .arg(req("description", "What it was"))
                        .arg(req("amount", "Positive amount"))
                        .arg(opt("type", "income|expense|transfer").default_value("expense"))
                        .arg(opt("category", "Category label").default_value("Food & Dining"))
                        .arg(req("account", "Source account (name or id)"))
                        .arg(opt("to", "Destination account for transfers"))
                        .arg(force()),
                )
                .subcommand(
                    Command::new("edit")
                        .arg(Arg::new("id").required(true).help("Transaction id or prefix"))
                        .arg(opt("date", "YYYY-MM-DD"))
                        .arg(opt("description", "What it was"))
                        .arg(opt("amount", "Positive amount"))
                        .arg(opt("type", "income|expense|transfer"))
                        .arg(opt("category", "Category label"))
                        .arg(opt("account", "Source account (name or id)"))
                        .arg(opt("to", "Destination account for transfers"))
                        .arg(force()),
                )
                .subcommand(
                    Command::new("rm")
                        .arg(Arg::new("id").required(true).help("Transaction id or prefix")),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(opt("type", "income|expense|transfer"))
                        .arg(opt("category", "Category label"))
                        .arg(opt("account", "Source or destination account"))
                        .arg(opt("month", "YYYY-MM"))
                        .arg(opt("limit", "Max rows").value_parser(value_parser!(usize))),
                )),
        )
        .subcommand(
            Command::new("report")
                .about("Dashboards and reports")
                .subcommand(json_flags(
                    Command::new("dashboard").arg(opt("month", "YYYY-MM, defaults to this month")),
                ))
                .subcommand(json_flags(
                    Command::new("trend").arg(
                        opt("months", "Number of months")
                            .value_parser(value_parser!(u32))
                            .default_value("6"),
                    ),
                ))
                .subcommand(json_flags(
                    Command::new("spending").arg(opt("month", "YYYY-MM, defaults to this month")),
                ))
                .subcommand(json_flags(Command::new("categories")))
                .subcommand(json_flags(
                    Command::new("daily").arg(
                        opt("days", "Days back from today")
                            .value_parser(value_parser!(i64))
                            .default_value("30"),
                    ),
                ))
                .subcommand(json_flags(
                    Command::new("account")
                        .arg(Arg::new("account").required(true).help("Account name or id")),
                )),
        )
        .subcommand(
            Command::new("settings")
                .about("Display preferences")
                .subcommand(Command::new("show"))
                .subcommand(
                    Command::new("set")
                        .arg(opt("currency", "Display currency, e.g. USD"))
                        .arg(opt("theme", "dark|light|system")),
                ),
        )
        .subcommand(
            Command::new("sync")
                .about("Inspect and retry queued backend writes")
                .subcommand(Command::new("status"))
                .subcommand(Command::new("push"))
                .subcommand(
                    Command::new("drop")
                        .about("Discard a queued write the backend keeps rejecting")
                        .arg(
                            Arg::new("index")
                                .required(true)
                                .value_parser(value_parser!(usize))
                                .help("Position shown by `sync status`"),
                        ),
                ),
        )
        .subcommand(Command::new("doctor").about("Check cached balances against the ledger"))
        .subcommand(
            Command::new("export").subcommand(
                Command::new("transactions")
                    .arg(opt("format", "csv|json").default_value("csv"))
                    .arg(req("out", "Output file")),
            ),
        )
        .subcommand(
            Command::new("reset")
                .about("Delete all accounts, transactions and categories")
                .arg(
                    Arg::new("yes")
                        .long("yes")
                        .action(ArgAction::SetTrue)
                        .required(true),
                ),
        )
}
