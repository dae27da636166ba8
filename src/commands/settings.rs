// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use super::Context;
use crate::config::KEYS;
use crate::utils::pretty_table;

pub fn handle(ctx: &mut Context, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", _)) => {
            let rows = KEYS
                .iter()
                .map(|k| vec![k.to_string(), ctx.config.get(k).unwrap_or_default()])
                .collect();
            println!("{}", pretty_table(ctx.config.table_style, &["Key", "Value"], rows));
        }
        Some(("set", sub)) => {
            let key = sub.get_one::<String>("key").unwrap();
            let value = sub.get_one::<String>("value").unwrap();
            ctx.config.set(&ctx.conn, key, value)?;
            println!(
                "Set {} = {}",
                key,
                ctx.config.get(key).unwrap_or_default()
            );
        }
        _ => {}
    }
    Ok(())
}
