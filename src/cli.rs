// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

const KINDS: [&str; 5] = ["country", "broker", "account", "stock", "ticker"];

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn purchase_fields(cmd: Command, required: bool) -> Command {
    let field = |name: &'static str, help: &'static str| {
        Arg::new(name).long(name).required(required).help(help)
    };
    cmd.arg(
        Arg::new("date")
            .long("date")
            .help("Trade date YYYY-MM-DD (defaults to today on add)"),
    )
    .arg(field("country", "Country (the domestic one records won amounts)"))
    .arg(field("broker", "Broker"))
    .arg(field("account", "Account number"))
    .arg(field("stock", "Stock name"))
    .arg(field("ticker", "Ticker"))
    .arg(field("price", "Unit price, e.g. 70,000"))
    .arg(field("quantity", "Quantity, e.g. 1,000"))
}

fn watch_fields(cmd: Command, ticker_required: bool) -> Command {
    cmd.arg(
        Arg::new("ticker")
            .long("ticker")
            .required(ticker_required)
            .help("Ticker code"),
    )
    .arg(Arg::new("name").long("name").help("Display name"))
    .arg(Arg::new("price-1yr").long("price-1yr").help("Price one year ago"))
    .arg(Arg::new("price-6mo").long("price-6mo").help("Price six months ago"))
    .arg(Arg::new("current").long("current").help("Current price"))
    .arg(
        Arg::new("fetch")
            .long("fetch")
            .action(ArgAction::SetTrue)
            .help("Fill blank fields from the quote provider (6-digit codes only)"),
    )
}

fn kind_arg() -> Arg {
    Arg::new("kind")
        .required(true)
        .value_parser(KINDS)
        .help("Reference list")
}

pub fn build_cli() -> Command {
    Command::new("stockledger")
        .about("Stock purchase ledger, reference lists, and quote watch list")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .global(true)
                .value_parser(value_parser!(std::path::PathBuf))
                .help("Directory holding the database and data files"),
        )
        .arg(
            Arg::new("backend")
                .long("backend")
                .global(true)
                .value_parser(["sqlite", "csv", "json"])
                .help("Purchase storage for this invocation"),
        )
        .subcommand(Command::new("init").about("Create the data directory and database"))
        .subcommand(
            Command::new("purchase")
                .about("Purchase records")
                .subcommand(purchase_fields(
                    Command::new("add").about("Record a purchase"),
                    true,
                ))
                .subcommand(purchase_fields(
                    Command::new("update")
                        .about("Change a purchase; omitted fields keep their values")
                        .arg(
                            Arg::new("id")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        ),
                    false,
                ))
                .subcommand(
                    Command::new("rm").about("Delete a purchase").arg(
                        Arg::new("id")
                            .required(true)
                            .value_parser(value_parser!(i64)),
                    ),
                )
                .subcommand(json_flags(
                    Command::new("list").about("List purchases in insertion order"),
                ))
                .subcommand(json_flags(
                    Command::new("show").about("Show one purchase").arg(
                        Arg::new("id")
                            .required(true)
                            .value_parser(value_parser!(i64)),
                    ),
                ))
                .subcommand(json_flags(
                    Command::new("summary").about("Total quantity per ticker"),
                ))
                .subcommand(
                    Command::new("preview")
                        .about("Compute the purchase amount without saving")
                        .arg(Arg::new("country").long("country").required(true))
                        .arg(Arg::new("price").long("price"))
                        .arg(Arg::new("quantity").long("quantity")),
                ),
        )
        .subcommand(
            Command::new("ref")
                .about("Reference lists (countries, brokers, accounts, stocks, tickers)")
                .subcommand(json_flags(
                    Command::new("list").about("List entries").arg(kind_arg()),
                ))
                .subcommand(
                    Command::new("add")
                        .about("Add an entry")
                        .arg(kind_arg())
                        .arg(Arg::new("name").required(true)),
                )
                .subcommand(
                    Command::new("rename")
                        .about("Rename an entry")
                        .arg(kind_arg())
                        .arg(
                            Arg::new("id")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(Arg::new("name").required(true)),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete an entry (see the reference_delete setting)")
                        .arg(kind_arg())
                        .arg(
                            Arg::new("id")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        ),
                ),
        )
        .subcommand(
            Command::new("watch")
                .about("Quote watch list")
                .subcommand(json_flags(Command::new("list").about("List watched tickers")))
                .subcommand(watch_fields(
                    Command::new("add").about("Add a watch row"),
                    true,
                ))
                .subcommand(watch_fields(
                    Command::new("update")
                        .about("Change a watch row; omitted fields keep their values")
                        .arg(
                            Arg::new("row")
                                .required(true)
                                .value_parser(value_parser!(usize)),
                        ),
                    false,
                ))
                .subcommand(
                    Command::new("rm").about("Delete a watch row").arg(
                        Arg::new("row")
                            .required(true)
                            .value_parser(value_parser!(usize)),
                    ),
                )
                .subcommand(
                    Command::new("quote")
                        .about("Look up a 6-digit domestic ticker")
                        .arg(Arg::new("code").required(true)),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Settings")
                .subcommand(Command::new("show").about("Show current settings"))
                .subcommand(
                    Command::new("set")
                        .about("Change a setting")
                        .arg(
                            Arg::new("key")
                                .required(true)
                                .value_parser(crate::config::KEYS),
                        )
                        .arg(Arg::new("value").required(true)),
                ),
        )
}
