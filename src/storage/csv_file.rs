// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord};
use rust_decimal::Decimal;
use std::path::PathBuf;

use super::PurchaseStore;
use crate::error::LoadError;
use crate::models::{PurchaseRecord, PurchaseRow};
use crate::utils::{fmt_amount, parse_date, parse_grouped_decimal, parse_grouped_quantity};

pub const FILE_NAME: &str = "purchases.csv";

pub const HEADERS: [&str; 11] = [
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

/// Spreadsheet-style purchase table. Amount cells hold the display form
/// (`$1,234`, `₩700,000`); the unused currency cell is left blank.
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvStore { path: path.into() }
    }
}

fn corrupt(line: usize, what: &str, value: &str) -> LoadError {
    LoadError::Corrupt(format!("line {}: invalid {} '{}'", line, what, value))
}

fn optional_amount(line: usize, what: &str, cell: &str) -> Result<Option<Decimal>, LoadError> {
    if cell.trim().is_empty() {
        return Ok(None);
    }
    parse_grouped_decimal(cell)
        .map(Some)
        .ok_or_else(|| corrupt(line, what, cell))
}

fn parse_row(line: usize, id: i64, rec: &StringRecord) -> Result<PurchaseRow, LoadError> {
    if rec.len() < 10 {
        return Err(LoadError::Corrupt(format!(
            "line {}: expected 10 columns, found {}",
            line,
            rec.len()
        )));
    }
    let cell = |i: usize| rec.get(i).unwrap_or("").trim();

    let trade_date = parse_date(cell(0)).map_err(|_| corrupt(line, "date", cell(0)))?;
    let unit_price =
        parse_grouped_decimal(cell(6)).ok_or_else(|| corrupt(line, "price", cell(6)))?;
    let quantity =
        parse_grouped_quantity(cell(7)).ok_or_else(|| corrupt(line, "quantity", cell(7)))?;

    Ok(PurchaseRow {
        id,
        trade_date,
        country: cell(1).to_string(),
        broker: cell(2).to_string(),
        account: cell(3).to_string(),
        stock_name: cell(4).to_string(),
        ticker: cell(5).to_string(),
        unit_price,
        quantity,
        amount_usd: optional_amount(line, "dollar amount", cell(8))?,
        amount_krw: optional_amount(line, "won amount", cell(9))?,
    })
}

impl PurchaseStore for CsvStore {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn load(&self) -> Result<Vec<PurchaseRow>, LoadError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)
            .with_context(|| format!("Open CSV {}", self.path.display()))?;

        let headers = rdr
            .headers()
            .map_err(|e| LoadError::Corrupt(e.to_string()))?
            .clone();
        let first = headers.get(0).map(|h| h.trim_start_matches('\u{feff}').trim());
        // Files written without the ID column get ids by row order.
        let has_id = match first {
            Some(h) if h == HEADERS[0] && headers.len() >= HEADERS.len() => true,
            Some(h) if h == HEADERS[1] && headers.len() >= HEADERS.len() - 1 => false,
            _ => {
                return Err(LoadError::Corrupt(format!(
                    "unrecognized header row {:?}",
                    headers
                )));
            }
        };

        let mut rows = Vec::new();
        for (idx, result) in rdr.records().enumerate() {
            let line = idx + 2;
            let rec = result.map_err(|e| LoadError::Corrupt(e.to_string()))?;
            let row = if has_id {
                let raw_id = rec.get(0).unwrap_or("").trim();
                let id: i64 = raw_id.parse().map_err(|_| corrupt(line, "id", raw_id))?;
                let rest: StringRecord = rec.iter().skip(1).collect();
                parse_row(line, id, &rest)?
            } else {
                parse_row(line, idx as i64 + 1, &rec)?
            };
            rows.push(row);
        }
        Ok(rows)
    }

    fn save(&self, records: &[PurchaseRecord]) -> Result<()> {
        let mut wtr = csv::Writer::from_path(&self.path)
            .with_context(|| format!("Write CSV {}", self.path.display()))?;
        wtr.write_record(HEADERS)?;
        for r in records {
            let (usd, krw) = match r.amount_usd() {
                Some(_) => (fmt_amount(&r.amount), String::new()),
                None => (String::new(), fmt_amount(&r.amount)),
            };
            wtr.write_record([
                r.id.to_string(),
                r.trade_date.to_string(),
                r.country.clone(),
                r.broker.clone(),
                r.account.clone(),
                r.stock_name.clone(),
                r.ticker.clone(),
                r.unit_price.to_string(),
                r.quantity.to_string(),
                usd,
                krw,
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }
}
