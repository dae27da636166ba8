// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, anyhow};

use super::Context;
use crate::models::ReferenceKind;
use crate::references::{ReferenceBook, remove_with_policy, rename_with_policy};
use crate::utils::{maybe_print_json, pretty_table};

fn kind_of(sub: &clap::ArgMatches) -> Result<ReferenceKind> {
    sub.get_one::<String>("kind")
        .unwrap()
        .parse::<ReferenceKind>()
        .map_err(|e| anyhow!(e))
}

pub fn handle(ctx: &Context, m: &clap::ArgMatches) -> Result<()> {
    let book = ReferenceBook::new(&ctx.conn);
    match m.subcommand() {
        Some(("list", sub)) => {
            let kind = kind_of(sub)?;
            let items = book.list(kind)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &items)? {
                let data = items
                    .into_iter()
                    .map(|i| vec![i.id.to_string(), i.name])
                    .collect();
                println!("{}", pretty_table(ctx.config.table_style, &["ID", "항목명"], data));
            }
        }
        Some(("add", sub)) => {
            let kind = kind_of(sub)?;
            let id = book.add(kind, sub.get_one::<String>("name").unwrap())?;
            let item = book.find(kind, id)?;
            println!("Added {} '{}' (#{})", kind, item.name, id);
        }
        Some(("rename", sub)) => {
            let kind = kind_of(sub)?;
            let id = *sub.get_one::<i64>("id").unwrap();
            let mut ledger = ctx.ledger()?;
            let outcome = rename_with_policy(
                &book,
                &mut ledger,
                kind,
                id,
                sub.get_one::<String>("name").unwrap(),
                ctx.config.reference_delete,
            )?;
            println!(
                "Renamed {} '{}' to '{}'",
                kind, outcome.old_name, outcome.item.name
            );
            if outcome.updated > 0 {
                println!("Updated {} purchase record(s)", outcome.updated);
            }
            if outcome.dangling > 0 {
                println!(
                    "{} purchase record(s) still name '{}'",
                    outcome.dangling, outcome.old_name
                );
            }
        }
        Some(("rm", sub)) => {
            let kind = kind_of(sub)?;
            let id = *sub.get_one::<i64>("id").unwrap();
            let mut ledger = ctx.ledger()?;
            let outcome =
                remove_with_policy(&book, &mut ledger, kind, id, ctx.config.reference_delete)?;
            println!("Removed {} '{}'", kind, outcome.item.name);
            if outcome.cascaded > 0 {
                println!("Deleted {} purchase record(s) naming it", outcome.cascaded);
            }
            if outcome.dangling > 0 {
                println!(
                    "{} purchase record(s) still name '{}'",
                    outcome.dangling, outcome.item.name
                );
            }
        }
        _ => {}
    }
    Ok(())
}
