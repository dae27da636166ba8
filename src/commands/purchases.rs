// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::Local;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use super::Context;
use crate::error::LedgerError;
use crate::ledger::preview_amount;
use crate::models::{PurchaseDraft, PurchaseRecord, ReferenceKind};
use crate::references::{ReferenceBook, normalize_name};
use crate::utils::{
    fmt_amount, group_count, group_thousands, maybe_print_json, parse_date, parse_grouped_decimal,
    parse_grouped_quantity, pretty_table,
};

const HEADERS: [&str; 11] = [
    "ID",
    "거래일자",
    "국가",
    "증권사",
    "계좌번호",
    "종목명",
    "틱커명",
    "매수단가",
    "매수수량",
    "달러매수금",
    "원화매수금",
];

pub fn handle(ctx: &Context, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(ctx, sub)?,
        Some(("update", sub)) => update(ctx, sub)?,
        Some(("rm", sub)) => remove(ctx, sub)?,
        Some(("list", sub)) => list(ctx, sub)?,
        Some(("show", sub)) => show(ctx, sub)?,
        Some(("summary", sub)) => summary(ctx, sub)?,
        Some(("preview", sub)) => preview(ctx, sub),
        _ => {}
    }
    Ok(())
}

/// Build a draft from CLI flags. Flags left out fall back to `base`; only
/// values given on the command line are checked against the reference lists.
pub fn draft_from_matches(
    ctx: &Context,
    sub: &clap::ArgMatches,
    base: Option<&PurchaseRecord>,
) -> Result<PurchaseDraft> {
    let book = ReferenceBook::new(&ctx.conn);
    let reference = |flag: &str, kind: ReferenceKind| -> Result<String> {
        match sub.get_one::<String>(flag) {
            Some(v) => {
                let value = normalize_name(v);
                book.validate(kind, &value)?;
                Ok(value)
            }
            None => Ok(base.map(|b| b.field(kind).to_string()).unwrap_or_default()),
        }
    };

    let trade_date = match (sub.get_one::<String>("date"), base) {
        (Some(raw), _) => parse_date(raw)?,
        (None, Some(b)) => b.trade_date,
        (None, None) => Local::now().date_naive(),
    };

    let unit_price = match (sub.get_one::<String>("price"), base) {
        (Some(raw), _) => parse_grouped_decimal(raw)
            .filter(|d| !d.is_sign_negative())
            .ok_or_else(|| LedgerError::InvalidNumber {
                field: "price",
                value: raw.clone(),
            })?,
        (None, Some(b)) => b.unit_price,
        (None, None) => {
            return Err(LedgerError::InvalidNumber {
                field: "price",
                value: String::new(),
            }
            .into());
        }
    };

    let quantity = match (sub.get_one::<String>("quantity"), base) {
        (Some(raw), _) => parse_grouped_quantity(raw).ok_or_else(|| LedgerError::InvalidNumber {
            field: "quantity",
            value: raw.clone(),
        })?,
        (None, Some(b)) => b.quantity,
        (None, None) => {
            return Err(LedgerError::InvalidNumber {
                field: "quantity",
                value: String::new(),
            }
            .into());
        }
    };

    Ok(PurchaseDraft {
        trade_date,
        country: reference("country", ReferenceKind::Country)?,
        broker: reference("broker", ReferenceKind::Broker)?,
        account: reference("account", ReferenceKind::Account)?,
        stock_name: reference("stock", ReferenceKind::StockName)?,
        ticker: reference("ticker", ReferenceKind::Ticker)?,
        unit_price,
        quantity,
    })
}

fn add(ctx: &Context, sub: &clap::ArgMatches) -> Result<()> {
    let draft = draft_from_matches(ctx, sub, None)?;
    let mut ledger = ctx.ledger()?;
    let id = ledger.add(draft)?;
    let r = ledger.get(id)?;
    println!(
        "Recorded purchase #{}: {} x {} @ {} ({})",
        id,
        group_thousands(&Decimal::from(r.quantity)),
        r.ticker,
        group_thousands(&r.unit_price),
        fmt_amount(&r.amount)
    );
    Ok(())
}

fn update(ctx: &Context, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let mut ledger = ctx.ledger()?;
    let current = ledger.get(id)?.clone();
    let draft = draft_from_matches(ctx, sub, Some(&current))?;
    ledger.update(id, draft)?;
    println!("Updated purchase #{}", id);
    Ok(())
}

fn remove(ctx: &Context, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let mut ledger = ctx.ledger()?;
    let removed = ledger.remove(id)?;
    println!(
        "Removed purchase #{} ({} {})",
        id, removed.trade_date, removed.ticker
    );
    Ok(())
}

fn table_row(r: &PurchaseRecord) -> Vec<String> {
    vec![
        r.id.to_string(),
        r.trade_date.to_string(),
        r.country.clone(),
        r.broker.clone(),
        r.account.clone(),
        r.stock_name.clone(),
        r.ticker.clone(),
        group_thousands(&r.unit_price),
        group_thousands(&Decimal::from(r.quantity)),
        r.amount_usd().map(|_| fmt_amount(&r.amount)).unwrap_or_default(),
        r.amount_krw().map(|_| fmt_amount(&r.amount)).unwrap_or_default(),
    ]
}

fn list(ctx: &Context, sub: &clap::ArgMatches) -> Result<()> {
    let ledger = ctx.ledger()?;
    let records = ledger.list();
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &records)? {
        let rows = records.iter().map(table_row).collect();
        println!("{}", pretty_table(ctx.config.table_style, &HEADERS, rows));
    }
    Ok(())
}

fn show(ctx: &Context, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let ledger = ctx.ledger()?;
    let r = ledger.get(id)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), r)? {
        let rows = HEADERS
            .iter()
            .zip(table_row(r))
            .map(|(h, v)| vec![h.to_string(), v])
            .collect();
        println!("{}", pretty_table(ctx.config.table_style, &["Field", "Value"], rows));
    }
    Ok(())
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Summary {
    pub by_ticker: BTreeMap<String, u128>,
    pub total: u128,
}

pub fn summarize(ctx: &Context) -> Result<Summary> {
    let ledger = ctx.ledger()?;
    Ok(Summary {
        by_ticker: ledger.aggregate_by_ticker(),
        total: ledger.total_quantity(),
    })
}

fn summary(ctx: &Context, sub: &clap::ArgMatches) -> Result<()> {
    let s = summarize(ctx)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
        let rows = s
            .by_ticker
            .iter()
            .map(|(t, q)| vec![t.clone(), format!("{} 주", group_count(*q))])
            .collect();
        println!(
            "{}",
            pretty_table(ctx.config.table_style, &["틱커명", "매수수량"], rows)
        );
        println!("주식 총 매수: {} 주", group_count(s.total));
    }
    Ok(())
}

/// Prints the amount, or nothing when price or quantity is not a number.
fn preview(ctx: &Context, sub: &clap::ArgMatches) {
    let text = |flag: &str| sub.get_one::<String>(flag).map(String::as_str).unwrap_or("");
    let country = text("country");
    if let Some(amount) = preview_amount(
        text("price"),
        text("quantity"),
        country,
        &ctx.config.domestic_country,
    ) {
        println!("{}", fmt_amount(&amount));
    }
}
