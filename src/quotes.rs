// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::utils::http_client;

static DOMESTIC_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{6}$").unwrap());

/// Name plus the 1-year-ago, 6-months-ago and latest closes, in whole won.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteSnapshot {
    pub name: String,
    pub price_1yr: Decimal,
    pub price_6mo: Decimal,
    pub current: Decimal,
}

pub trait QuoteProvider {
    fn lookup(&self, code: &str) -> Result<QuoteSnapshot>;
}

pub fn validate_code(code: &str) -> Result<&str, LedgerError> {
    let code = code.trim();
    if DOMESTIC_CODE.is_match(code) {
        Ok(code)
    } else {
        Err(LedgerError::InvalidCode(code.to_string()))
    }
}

/// Index of the "six months ago" close in a year of daily closes.
pub fn middle_index(len: usize) -> usize {
    match len / 2 {
        0 => 0,
        half => len - half,
    }
}

fn whole_won(px: f64) -> Option<Decimal> {
    Decimal::from_f64_retain(px).map(|d| d.trunc())
}

pub fn snapshot_from_closes(name: &str, closes: &[Option<f64>]) -> Option<QuoteSnapshot> {
    let closes: Vec<Decimal> = closes.iter().flatten().filter_map(|px| whole_won(*px)).collect();
    let first = *closes.first()?;
    let last = *closes.last()?;
    Some(QuoteSnapshot {
        name: name.to_string(),
        price_1yr: first,
        price_6mo: closes[middle_index(closes.len())],
        current: last,
    })
}

/// Look up `code`, logging and swallowing any failure.
pub fn try_fill(provider: &dyn QuoteProvider, code: &str) -> Option<QuoteSnapshot> {
    let code = match validate_code(code) {
        Ok(c) => c,
        Err(e) => {
            warn!("quote lookup skipped: {}", e);
            return None;
        }
    };
    match provider.lookup(code) {
        Ok(s) => Some(s),
        Err(e) => {
            warn!("quote lookup for {} failed: {:#}", code, e);
            None
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(rename = "longName")]
    long_name: Option<String>,
    #[serde(rename = "shortName")]
    short_name: Option<String>,
    symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteSeries>,
}

#[derive(Debug, Deserialize)]
struct QuoteSeries {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Yahoo Finance chart endpoint, KOSPI listing (`<code>.KS`).
pub struct YahooChart {
    base_url: String,
}

impl Default for YahooChart {
    fn default() -> Self {
        YahooChart {
            base_url: "https://query1.finance.yahoo.com/v8/finance/chart".to_string(),
        }
    }
}

fn parse_chart(code: &str, body: &str) -> Result<QuoteSnapshot> {
    let resp: ChartResponse =
        serde_json::from_str(body).with_context(|| format!("Decode chart for {}", code))?;
    if let Some(err) = resp.chart.error {
        return Err(anyhow!(
            "provider error for {}: {}",
            code,
            err.description.unwrap_or_default()
        ));
    }
    let result = resp
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| anyhow!("no chart data for {}", code))?;
    let name = result
        .meta
        .long_name
        .or(result.meta.short_name)
        .or(result.meta.symbol)
        .unwrap_or_else(|| code.to_string());
    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();
    snapshot_from_closes(&name, &closes).ok_or_else(|| anyhow!("no closing prices for {}", code))
}

impl QuoteProvider for YahooChart {
    fn lookup(&self, code: &str) -> Result<QuoteSnapshot> {
        let url = format!("{}/{}.KS?range=1y&interval=1d", self.base_url, code);
        let client = http_client()?;
        let body = client.get(url).send()?.error_for_status()?.text()?;
        parse_chart(code, &body)
    }
}
