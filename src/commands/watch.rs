// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rust_decimal::Decimal;

use super::Context;
use crate::error::LedgerError;
use crate::models::WatchEntry;
use crate::quotes::{QuoteProvider, try_fill, validate_code};
use crate::utils::{fmt_won, maybe_print_json, parse_grouped_decimal, pretty_table};

pub fn handle(ctx: &Context, m: &clap::ArgMatches, provider: &dyn QuoteProvider) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(ctx, sub)?,
        Some(("add", sub)) => {
            let entry = entry_from_matches(sub, WatchEntry::default(), provider)?;
            let mut wl = ctx.watchlist()?;
            let row = wl.add(entry)?;
            println!("Added watch row {}", row);
        }
        Some(("update", sub)) => {
            let row = *sub.get_one::<usize>("row").unwrap();
            let mut wl = ctx.watchlist()?;
            let base = wl.get(row)?.clone();
            let entry = entry_from_matches(sub, base, provider)?;
            wl.update(row, entry)?;
            println!("Updated watch row {}", row);
        }
        Some(("rm", sub)) => {
            let row = *sub.get_one::<usize>("row").unwrap();
            let mut wl = ctx.watchlist()?;
            let removed = wl.remove(row)?;
            println!("Removed watch row {} ({})", row, removed.ticker);
        }
        Some(("quote", sub)) => {
            let code = validate_code(sub.get_one::<String>("code").unwrap())?;
            match try_fill(provider, code) {
                Some(q) => println!(
                    "{} {}: 1y {} / 6m {} / now {}",
                    code,
                    q.name,
                    fmt_won(&q.price_1yr),
                    fmt_won(&q.price_6mo),
                    fmt_won(&q.current)
                ),
                None => println!("No quote available for {}", code),
            }
        }
        _ => {}
    }
    Ok(())
}

fn price_flag(sub: &clap::ArgMatches, flag: &'static str) -> Result<Option<Option<Decimal>>> {
    match sub.get_one::<String>(flag) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(Some(None)),
        Some(raw) => parse_grouped_decimal(raw)
            .filter(|d| !d.is_sign_negative())
            .map(|d| Some(Some(d)))
            .ok_or_else(|| {
                LedgerError::InvalidNumber {
                    field: flag,
                    value: raw.clone(),
                }
                .into()
            }),
    }
}

/// Apply CLI flags over `base`. With `--fetch`, a successful lookup replaces
/// every field not given on the command line; a failed one changes nothing.
pub fn entry_from_matches(
    sub: &clap::ArgMatches,
    base: WatchEntry,
    provider: &dyn QuoteProvider,
) -> Result<WatchEntry> {
    let mut entry = base;
    let name = sub.get_one::<String>("name");
    let price_1yr = price_flag(sub, "price-1yr")?;
    let price_6mo = price_flag(sub, "price-6mo")?;
    let current = price_flag(sub, "current")?;

    if let Some(t) = sub.get_one::<String>("ticker") {
        entry.ticker = t.trim().to_string();
    }

    if sub.get_flag("fetch") {
        if let Some(q) = try_fill(provider, &entry.ticker) {
            entry.name = q.name;
            entry.price_1yr = Some(q.price_1yr);
            entry.price_6mo = Some(q.price_6mo);
            entry.current_price = Some(q.current);
        }
    }

    if let Some(n) = name {
        entry.name = n.trim().to_string();
    }
    if let Some(p) = price_1yr {
        entry.price_1yr = p;
    }
    if let Some(p) = price_6mo {
        entry.price_6mo = p;
    }
    if let Some(p) = current {
        entry.current_price = p;
    }
    Ok(entry)
}

fn list(ctx: &Context, sub: &clap::ArgMatches) -> Result<()> {
    let wl = ctx.watchlist()?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &wl.list())? {
        let cell = |p: &Option<Decimal>| p.as_ref().map(fmt_won).unwrap_or_default();
        let rows = wl
            .list()
            .iter()
            .enumerate()
            .map(|(i, e)| {
                vec![
                    (i + 1).to_string(),
                    e.ticker.clone(),
                    e.name.clone(),
                    cell(&e.price_1yr),
                    cell(&e.price_6mo),
                    cell(&e.current_price),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                ctx.config.table_style,
                &["#", "틱커명", "종목명", "1년전가격", "6개월전가격", "현재가격"],
                rows,
            )
        );
    }
    Ok(())
}
