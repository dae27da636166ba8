// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::path::PathBuf;

use stockledger::commands::{self, Context};
use stockledger::quotes::YahooChart;
use stockledger::{cli, db};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let dir = db::data_dir(matches.get_one::<PathBuf>("data-dir").map(PathBuf::as_path))?;
    let conn = db::open_or_init(&dir)?;
    let mut ctx = Context::new(conn, dir)?;
    if let Some(backend) = matches.get_one::<String>("backend") {
        ctx.config.apply("backend", backend)?;
    }

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path(&ctx.data_dir).display());
        }
        Some(("purchase", sub)) => commands::purchases::handle(&ctx, sub)?,
        Some(("ref", sub)) => commands::references::handle(&ctx, sub)?,
        Some(("watch", sub)) => commands::watch::handle(&ctx, sub, &YahooChart::default())?,
        Some(("config", sub)) => commands::settings::handle(&mut ctx, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
