// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;

use super::PurchaseStore;
use crate::error::LoadError;
use crate::models::{PurchaseRecord, PurchaseRow};
use crate::utils::{parse_date, parse_grouped_decimal};

/// The `purchase` table of the application database.
pub struct SqliteStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        SqliteStore { conn }
    }
}

fn decimal_column(id: i64, what: &str, raw: &str) -> Result<Decimal, LoadError> {
    parse_grouped_decimal(raw).ok_or_else(|| {
        LoadError::Corrupt(format!("purchase {}: invalid {} '{}'", id, what, raw))
    })
}

fn optional_decimal_column(id: i64, what: &str, raw: Option<String>) -> Result<Option<Decimal>, LoadError> {
    match raw {
        Some(s) if !s.trim().is_empty() => decimal_column(id, what, &s).map(Some),
        _ => Ok(None),
    }
}

impl PurchaseStore for SqliteStore<'_> {
    fn describe(&self) -> String {
        self.conn
            .path()
            .map(|p| format!("{}#purchase", p))
            .unwrap_or_else(|| "sqlite#purchase".to_string())
    }

    fn load(&self) -> Result<Vec<PurchaseRow>, LoadError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, date, country, broker, account, stock, ticker, price, quantity,
                        dollar_amount, won_amount
                 FROM purchase ORDER BY id",
            )
            .context("Query purchase table")?;
        let raw = stmt
            .query_map([], |r| {
                Ok((
                    r.get::<_, i64>(0)?,
                    r.get::<_, String>(1)?,
                    [
                        r.get::<_, String>(2)?,
                        r.get::<_, String>(3)?,
                        r.get::<_, String>(4)?,
                        r.get::<_, String>(5)?,
                        r.get::<_, String>(6)?,
                    ],
                    r.get::<_, String>(7)?,
                    r.get::<_, i64>(8)?,
                    r.get::<_, Option<String>>(9)?,
                    r.get::<_, Option<String>>(10)?,
                ))
            })
            .context("Query purchase table")?;

        let mut rows = Vec::new();
        for row in raw {
            let (id, date_s, names, price_s, qty, usd_s, krw_s) =
                row.map_err(|e| LoadError::Corrupt(e.to_string()))?;
            let trade_date = parse_date(&date_s).map_err(|_| {
                LoadError::Corrupt(format!("purchase {}: invalid date '{}'", id, date_s))
            })?;
            let quantity = u64::try_from(qty).map_err(|_| {
                LoadError::Corrupt(format!("purchase {}: negative quantity {}", id, qty))
            })?;
            let [country, broker, account, stock_name, ticker] = names;
            rows.push(PurchaseRow {
                id,
                trade_date,
                country,
                broker,
                account,
                stock_name,
                ticker,
                unit_price: decimal_column(id, "price", &price_s)?,
                quantity,
                amount_usd: optional_decimal_column(id, "dollar amount", usd_s)?,
                amount_krw: optional_decimal_column(id, "won amount", krw_s)?,
            });
        }
        Ok(rows)
    }

    fn save(&self, records: &[PurchaseRecord]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM purchase", [])?;
        {
            let mut insert = tx.prepare_cached(
                "INSERT INTO purchase(id, date, country, broker, account, stock, ticker, price,
                                      quantity, dollar_amount, won_amount)
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11)",
            )?;
            for r in records {
                let qty = i64::try_from(r.quantity)
                    .with_context(|| format!("Quantity {} too large to store", r.quantity))?;
                insert.execute(params![
                    r.id,
                    r.trade_date.to_string(),
                    r.country,
                    r.broker,
                    r.account,
                    r.stock_name,
                    r.ticker,
                    r.unit_price.to_string(),
                    qty,
                    r.amount_usd().map(|d| d.to_string()),
                    r.amount_krw().map(|d| d.to_string()),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}
