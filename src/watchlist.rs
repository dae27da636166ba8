// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Quote watch list kept in a JSON file of 5-field rows:
//! `[ticker, name, price_1yr, price_6mo, current_price]`.

use anyhow::{Context, Result};
use log::{debug, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{LedgerError, LedgerResult};
use crate::models::WatchEntry;
use crate::utils::{fmt_won, parse_grouped_decimal};

pub const FILE_NAME: &str = "watchlist.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WatchRow(String, String, String, String, String);

fn price_cell(p: &Option<Decimal>) -> String {
    p.as_ref().map(fmt_won).unwrap_or_default()
}

impl From<&WatchEntry> for WatchRow {
    fn from(e: &WatchEntry) -> Self {
        WatchRow(
            e.ticker.clone(),
            e.name.clone(),
            price_cell(&e.price_1yr),
            price_cell(&e.price_6mo),
            price_cell(&e.current_price),
        )
    }
}

/// A cell that is neither blank nor a number is dropped, and is written back
/// blank on the next save.
fn cell_price(ticker: &str, column: &str, cell: &str) -> Option<Decimal> {
    let price = parse_grouped_decimal(cell);
    if price.is_none() && !cell.trim().is_empty() {
        warn!(
            "watch row {}: {} '{}' is not a price; it will be cleared on the next save",
            ticker, column, cell
        );
    }
    price
}

impl From<WatchRow> for WatchEntry {
    fn from(r: WatchRow) -> Self {
        WatchEntry {
            price_1yr: cell_price(&r.0, "price_1yr", &r.2),
            price_6mo: cell_price(&r.0, "price_6mo", &r.3),
            current_price: cell_price(&r.0, "current_price", &r.4),
            ticker: r.0,
            name: r.1,
        }
    }
}

pub struct WatchList {
    path: PathBuf,
    entries: Vec<WatchEntry>,
}

impl WatchList {
    /// Read the file; a missing, empty or unparseable file becomes `[]`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut list = WatchList {
            path,
            entries: Vec::new(),
        };
        if !list.path.exists() {
            list.save()?;
            return Ok(list);
        }
        let raw = fs::read_to_string(&list.path)
            .with_context(|| format!("Read {}", list.path.display()))?;
        match serde_json::from_str::<Vec<WatchRow>>(&raw) {
            Ok(rows) => list.entries = rows.into_iter().map(WatchEntry::from).collect(),
            Err(e) => {
                warn!(
                    "watch list {} is unreadable ({}); resetting to empty",
                    list.path.display(),
                    e
                );
                list.save()?;
            }
        }
        Ok(list)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn list(&self) -> &[WatchEntry] {
        &self.entries
    }

    fn save(&self) -> Result<()> {
        let rows: Vec<WatchRow> = self.entries.iter().map(WatchRow::from).collect();
        fs::write(&self.path, serde_json::to_string_pretty(&rows)?)
            .with_context(|| format!("Write {}", self.path.display()))?;
        debug!("saved {} watch row(s) to {}", rows.len(), self.path.display());
        Ok(())
    }

    fn index(&self, row: usize) -> LedgerResult<usize> {
        if row == 0 || row > self.entries.len() {
            return Err(LedgerError::RowNotFound(row));
        }
        Ok(row - 1)
    }

    /// Append and return the 1-based row.
    pub fn add(&mut self, entry: WatchEntry) -> LedgerResult<usize> {
        self.entries.push(entry);
        if let Err(e) = self.save() {
            self.entries.pop();
            return Err(e.into());
        }
        Ok(self.entries.len())
    }

    pub fn get(&self, row: usize) -> LedgerResult<&WatchEntry> {
        let idx = self.index(row)?;
        Ok(&self.entries[idx])
    }

    pub fn update(&mut self, row: usize, entry: WatchEntry) -> LedgerResult<()> {
        let idx = self.index(row)?;
        let previous = std::mem::replace(&mut self.entries[idx], entry);
        if let Err(e) = self.save() {
            self.entries[idx] = previous;
            return Err(e.into());
        }
        Ok(())
    }

    pub fn remove(&mut self, row: usize) -> LedgerResult<WatchEntry> {
        let idx = self.index(row)?;
        let removed = self.entries.remove(idx);
        if let Err(e) = self.save() {
            self.entries.insert(idx, removed);
            return Err(e.into());
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samsung() -> WatchEntry {
        WatchEntry {
            ticker: "005930".into(),
            name: "Samsung Electronics".into(),
            price_1yr: Some(Decimal::from(71000)),
            price_6mo: Some(Decimal::from(61500)),
            current_price: Some(Decimal::from(75400)),
        }
    }

    #[test]
    fn rows_are_five_string_arrays() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FILE_NAME);
        let mut list = WatchList::open(&path).unwrap();
        list.add(samsung()).unwrap();
        list.add(WatchEntry {
            ticker: "000660".into(),
            ..WatchEntry::default()
        })
        .unwrap();

        let v: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            v[0],
            serde_json::json!([
                "005930",
                "Samsung Electronics",
                "71,000 원",
                "61,500 원",
                "75,400 원"
            ])
        );
        assert_eq!(v[1], serde_json::json!(["000660", "", "", "", ""]));

        let reopened = WatchList::open(&path).unwrap();
        assert_eq!(reopened.list(), list.list());
    }

    #[test]
    fn non_numeric_price_cells_load_as_blank() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FILE_NAME);
        fs::write(&path, r#"[["005930", "삼성전자", "n/a", "61,500 원", "?"]]"#).unwrap();

        let list = WatchList::open(&path).unwrap();
        let e = list.get(1).unwrap();
        assert_eq!(e.name, "삼성전자");
        assert_eq!(e.price_1yr, None);
        assert_eq!(e.price_6mo, Some(Decimal::from(61500)));
        assert_eq!(e.current_price, None);
        // Loading alone does not rewrite the file.
        assert!(fs::read_to_string(&path).unwrap().contains("n/a"));
    }

    #[test]
    fn corrupt_file_resets_to_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FILE_NAME);
        fs::write(&path, "{not json").unwrap();
        let list = WatchList::open(&path).unwrap();
        assert!(list.list().is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap().trim(), "[]");
    }

    #[test]
    fn rows_are_one_based_and_checked() {
        let dir = tempfile::tempdir().unwrap();
        let mut list = WatchList::open(dir.path().join(FILE_NAME)).unwrap();
        assert_eq!(list.add(samsung()).unwrap(), 1);
        assert!(matches!(list.remove(0), Err(LedgerError::RowNotFound(0))));
        assert!(matches!(
            list.update(2, samsung()),
            Err(LedgerError::RowNotFound(2))
        ));
        let mut renamed = samsung();
        renamed.name = "삼성전자".into();
        list.update(1, renamed).unwrap();
        assert_eq!(list.get(1).unwrap().name, "삼성전자");
        list.remove(1).unwrap();
        assert!(list.list().is_empty());
    }
}
