// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    Usd,
    Krw,
}

impl Currency {
    pub fn symbol(self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Krw => "₩",
        }
    }
}

/// Purchase amount in exactly one currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseAmount {
    Usd(Decimal),
    Krw(Decimal),
}

impl PurchaseAmount {
    pub fn currency(&self) -> Currency {
        match self {
            PurchaseAmount::Usd(_) => Currency::Usd,
            PurchaseAmount::Krw(_) => Currency::Krw,
        }
    }

    pub fn value(&self) -> Decimal {
        match self {
            PurchaseAmount::Usd(d) | PurchaseAmount::Krw(d) => *d,
        }
    }

    pub fn usd(&self) -> Option<Decimal> {
        match self {
            PurchaseAmount::Usd(d) => Some(*d),
            PurchaseAmount::Krw(_) => None,
        }
    }

    pub fn krw(&self) -> Option<Decimal> {
        match self {
            PurchaseAmount::Krw(d) => Some(*d),
            PurchaseAmount::Usd(_) => None,
        }
    }
}

/// Form input for a purchase: everything except the id and the derived amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseDraft {
    pub trade_date: NaiveDate,
    pub country: String,
    pub broker: String,
    pub account: String,
    pub stock_name: String,
    pub ticker: String,
    pub unit_price: Decimal,
    pub quantity: u64,
}

impl PurchaseDraft {
    pub fn field_mut(&mut self, kind: ReferenceKind) -> &mut String {
        match kind {
            ReferenceKind::Country => &mut self.country,
            ReferenceKind::Broker => &mut self.broker,
            ReferenceKind::Account => &mut self.account,
            ReferenceKind::StockName => &mut self.stock_name,
            ReferenceKind::Ticker => &mut self.ticker,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "PurchaseRow", try_from = "PurchaseRow")]
pub struct PurchaseRecord {
    pub id: i64,
    pub trade_date: NaiveDate,
    pub country: String,
    pub broker: String,
    pub account: String,
    pub stock_name: String,
    pub ticker: String,
    pub unit_price: Decimal,
    pub quantity: u64,
    pub amount: PurchaseAmount,
}

impl PurchaseRecord {
    pub fn amount_usd(&self) -> Option<Decimal> {
        self.amount.usd()
    }

    pub fn amount_krw(&self) -> Option<Decimal> {
        self.amount.krw()
    }

    pub fn to_draft(&self) -> PurchaseDraft {
        PurchaseDraft {
            trade_date: self.trade_date,
            country: self.country.clone(),
            broker: self.broker.clone(),
            account: self.account.clone(),
            stock_name: self.stock_name.clone(),
            ticker: self.ticker.clone(),
            unit_price: self.unit_price,
            quantity: self.quantity,
        }
    }

    pub fn field(&self, kind: ReferenceKind) -> &str {
        match kind {
            ReferenceKind::Country => &self.country,
            ReferenceKind::Broker => &self.broker,
            ReferenceKind::Account => &self.account,
            ReferenceKind::StockName => &self.stock_name,
            ReferenceKind::Ticker => &self.ticker,
        }
    }
}

/// Flat serialized shape of a record, with both nullable amount columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseRow {
    pub id: i64,
    pub trade_date: NaiveDate,
    pub country: String,
    pub broker: String,
    pub account: String,
    pub stock_name: String,
    pub ticker: String,
    pub unit_price: Decimal,
    pub quantity: u64,
    pub amount_usd: Option<Decimal>,
    pub amount_krw: Option<Decimal>,
}

impl From<PurchaseRecord> for PurchaseRow {
    fn from(r: PurchaseRecord) -> Self {
        PurchaseRow {
            amount_usd: r.amount.usd(),
            amount_krw: r.amount.krw(),
            id: r.id,
            trade_date: r.trade_date,
            country: r.country,
            broker: r.broker,
            account: r.account,
            stock_name: r.stock_name,
            ticker: r.ticker,
            unit_price: r.unit_price,
            quantity: r.quantity,
        }
    }
}

impl TryFrom<PurchaseRow> for PurchaseRecord {
    type Error = String;

    fn try_from(r: PurchaseRow) -> Result<Self, Self::Error> {
        let amount = match (r.amount_usd, r.amount_krw) {
            (Some(d), None) => PurchaseAmount::Usd(d),
            (None, Some(d)) => PurchaseAmount::Krw(d),
            (usd, krw) => {
                return Err(format!(
                    "record {} must carry exactly one amount (usd={:?}, krw={:?})",
                    r.id, usd, krw
                ));
            }
        };
        Ok(PurchaseRecord {
            id: r.id,
            trade_date: r.trade_date,
            country: r.country,
            broker: r.broker,
            account: r.account,
            stock_name: r.stock_name,
            ticker: r.ticker,
            unit_price: r.unit_price,
            quantity: r.quantity,
            amount,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Country,
    Broker,
    Account,
    StockName,
    Ticker,
}

impl ReferenceKind {
    pub fn table(self) -> &'static str {
        match self {
            ReferenceKind::Country => "country",
            ReferenceKind::Broker => "broker",
            ReferenceKind::Account => "account_number",
            ReferenceKind::StockName => "stock_name",
            ReferenceKind::Ticker => "ticker_name",
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReferenceKind::Country => "country",
            ReferenceKind::Broker => "broker",
            ReferenceKind::Account => "account",
            ReferenceKind::StockName => "stock",
            ReferenceKind::Ticker => "ticker",
        };
        f.write_str(s)
    }
}

impl FromStr for ReferenceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "country" => Ok(ReferenceKind::Country),
            "broker" => Ok(ReferenceKind::Broker),
            "account" => Ok(ReferenceKind::Account),
            "stock" | "stock_name" => Ok(ReferenceKind::StockName),
            "ticker" => Ok(ReferenceKind::Ticker),
            other => Err(format!(
                "unknown reference kind '{}' (use country|broker|account|stock|ticker)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceItem {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WatchEntry {
    pub ticker: String,
    pub name: String,
    pub price_1yr: Option<Decimal>,
    pub price_6mo: Option<Decimal>,
    pub current_price: Option<Decimal>,
}
