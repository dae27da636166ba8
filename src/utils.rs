// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::{Cell, CellAlignment, Table};
use rust_decimal::Decimal;

use crate::config::TableStyle;
use crate::models::PurchaseAmount;

const UA: &str = concat!(
    "stockledger/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/alphavelocity/stockledger)"
);

pub fn http_client() -> Result<reqwest::blocking::Client> {
    let c = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(15))
        .user_agent(UA)
        .build()?;
    Ok(c)
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

/// Remove thousands separators, whitespace, currency symbols and the won suffix.
pub fn strip_grouping(s: &str) -> String {
    let s = s.trim();
    let s = s.strip_suffix('원').unwrap_or(s);
    s.chars()
        .filter(|c| !matches!(c, ',' | '$' | '₩') && !c.is_whitespace())
        .collect()
}

/// Parse a possibly grouped decimal like `"70,000"`. Empty or malformed text is `None`.
pub fn parse_grouped_decimal(s: &str) -> Option<Decimal> {
    let raw = strip_grouping(s);
    if raw.is_empty() {
        return None;
    }
    raw.parse::<Decimal>().ok()
}

pub fn parse_grouped_quantity(s: &str) -> Option<u64> {
    let raw = strip_grouping(s);
    if raw.is_empty() {
        return None;
    }
    raw.parse::<u64>().ok()
}

pub fn group_thousands(d: &Decimal) -> String {
    let s = d.normalize().to_string();
    let (sign, body) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };
    let (int_part, frac_part) = match body.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (body, None),
    };

    let grouped = group_digits(int_part);
    match frac_part {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

fn group_digits(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Share counts, which may exceed what a `Decimal` holds once summed.
pub fn group_count(n: u128) -> String {
    group_digits(&n.to_string())
}

/// `$1,234` / `₩700,000`.
pub fn fmt_amount(amount: &PurchaseAmount) -> String {
    format!(
        "{}{}",
        amount.currency().symbol(),
        group_thousands(&amount.value())
    )
}

pub fn fmt_won(d: &Decimal) -> String {
    format!("{} 원", group_thousands(d))
}

pub fn pretty_table(style: TableStyle, headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(style.preset());
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(|v| {
            let numeric = v
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_digit() || c == '$' || c == '₩');
            let cell = Cell::new(v);
            if numeric {
                cell.set_alignment(CellAlignment::Right)
            } else {
                cell
            }
        }));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}
