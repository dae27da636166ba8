// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The purchase ledger: insertion-ordered records over a [`PurchaseStore`],
//! plus the currency rules that derive each record's amount.

use anyhow::Context;
use log::{debug, warn};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::error::{LedgerError, LedgerResult, LoadError};
use crate::models::{
    Currency, PurchaseAmount, PurchaseDraft, PurchaseRecord, PurchaseRow, ReferenceKind,
};
use crate::storage::PurchaseStore;
use crate::utils::{parse_grouped_decimal, parse_grouped_quantity};

pub fn is_domestic(country: &str, domestic: &str) -> bool {
    country.trim().to_uppercase() == domestic.trim().to_uppercase()
}

/// KRW for the domestic country, USD for every other one.
pub fn currency_for(country: &str, domestic: &str) -> Currency {
    if is_domestic(country, domestic) {
        Currency::Krw
    } else {
        Currency::Usd
    }
}

/// `price × quantity` in `currency`, or `None` when the product does not fit a `Decimal`.
pub fn recompute_amount(
    price: Decimal,
    quantity: u64,
    currency: Currency,
) -> Option<PurchaseAmount> {
    let total = price.checked_mul(Decimal::from(quantity))?;
    Some(match currency {
        Currency::Krw => PurchaseAmount::Krw(total),
        Currency::Usd => PurchaseAmount::Usd(total),
    })
}

/// Amount for raw form text. Empty or non-numeric input yields `None`.
pub fn preview_amount(
    price_text: &str,
    quantity_text: &str,
    country: &str,
    domestic: &str,
) -> Option<PurchaseAmount> {
    let price = parse_grouped_decimal(price_text)?;
    let quantity = parse_grouped_quantity(quantity_text)?;
    if price.is_sign_negative() {
        return None;
    }
    recompute_amount(price, quantity, currency_for(country, domestic))
}

/// Turn a persisted row into a record, re-deriving the amount when the stored
/// columns disagree with the country.
fn reconcile(row: PurchaseRow, domestic: &str) -> Result<PurchaseRecord, LoadError> {
    let currency = currency_for(&row.country, domestic);
    let (stored, other) = match currency {
        Currency::Krw => (row.amount_krw, row.amount_usd),
        Currency::Usd => (row.amount_usd, row.amount_krw),
    };
    let amount = match (stored, other) {
        (Some(d), None) => match currency {
            Currency::Krw => PurchaseAmount::Krw(d),
            Currency::Usd => PurchaseAmount::Usd(d),
        },
        _ => {
            warn!(
                "purchase {} ({}) has amounts inconsistent with its country; recomputing",
                row.id, row.country
            );
            recompute_amount(row.unit_price, row.quantity, currency).ok_or_else(|| {
                LoadError::Corrupt(format!("purchase {}: amount out of range", row.id))
            })?
        }
    };
    Ok(PurchaseRecord {
        id: row.id,
        trade_date: row.trade_date,
        country: row.country,
        broker: row.broker,
        account: row.account,
        stock_name: row.stock_name,
        ticker: row.ticker,
        unit_price: row.unit_price,
        quantity: row.quantity,
        amount,
    })
}

pub struct Ledger<S: PurchaseStore> {
    store: S,
    domestic: String,
    records: Vec<PurchaseRecord>,
}

impl<S: PurchaseStore> Ledger<S> {
    /// Load every record. A corrupt store is logged and reset to empty.
    pub fn open(store: S, domestic: &str) -> anyhow::Result<Self> {
        let loaded = store.load().and_then(|rows| {
            rows.into_iter()
                .map(|r| reconcile(r, domestic))
                .collect::<Result<Vec<_>, _>>()
        });
        let records = match loaded {
            Ok(records) => records,
            Err(LoadError::Corrupt(reason)) => {
                warn!(
                    "purchase store {} is unreadable ({}); resetting to empty",
                    store.describe(),
                    reason
                );
                store
                    .save(&[])
                    .with_context(|| format!("Reset {}", store.describe()))?;
                Vec::new()
            }
            Err(LoadError::Other(e)) => return Err(e),
        };
        if !store.exists() {
            store
                .save(&[])
                .with_context(|| format!("Initialize {}", store.describe()))?;
        }
        Ok(Ledger {
            store,
            domestic: domestic.to_string(),
            records,
        })
    }

    pub fn domestic(&self) -> &str {
        &self.domestic
    }

    pub fn list(&self) -> &[PurchaseRecord] {
        &self.records
    }

    pub fn get(&self, id: i64) -> LedgerResult<&PurchaseRecord> {
        self.records
            .iter()
            .find(|r| r.id == id)
            .ok_or(LedgerError::NotFound(id))
    }

    fn next_id(&self) -> i64 {
        self.records.iter().map(|r| r.id).max().unwrap_or(0) + 1
    }

    fn build(&self, id: i64, draft: PurchaseDraft) -> LedgerResult<PurchaseRecord> {
        let currency = currency_for(&draft.country, &self.domestic);
        let amount = recompute_amount(draft.unit_price, draft.quantity, currency).ok_or_else(
            || LedgerError::InvalidNumber {
                field: "amount",
                value: format!("{} x {}", draft.unit_price, draft.quantity),
            },
        )?;
        Ok(PurchaseRecord {
            amount,
            id,
            trade_date: draft.trade_date,
            country: draft.country,
            broker: draft.broker,
            account: draft.account,
            stock_name: draft.stock_name,
            ticker: draft.ticker,
            unit_price: draft.unit_price,
            quantity: draft.quantity,
        })
    }

    /// Persist `next` and adopt it only once the write succeeded.
    fn commit(&mut self, next: Vec<PurchaseRecord>) -> LedgerResult<()> {
        self.store.save(&next)?;
        debug!(
            "saved {} purchase record(s) to {}",
            next.len(),
            self.store.describe()
        );
        self.records = next;
        Ok(())
    }

    pub fn add(&mut self, draft: PurchaseDraft) -> LedgerResult<i64> {
        let id = self.next_id();
        let record = self.build(id, draft)?;
        let mut next = self.records.clone();
        next.push(record);
        self.commit(next)?;
        Ok(id)
    }

    pub fn update(&mut self, id: i64, draft: PurchaseDraft) -> LedgerResult<()> {
        let pos = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or(LedgerError::NotFound(id))?;
        let record = self.build(id, draft)?;
        let mut next = self.records.clone();
        next[pos] = record;
        self.commit(next)
    }

    pub fn remove(&mut self, id: i64) -> LedgerResult<PurchaseRecord> {
        let pos = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or(LedgerError::NotFound(id))?;
        let mut next = self.records.clone();
        let removed = next.remove(pos);
        self.commit(next)?;
        Ok(removed)
    }

    /// Ids of records whose `kind` field equals `name`.
    pub fn references_to(&self, kind: ReferenceKind, name: &str) -> Vec<i64> {
        self.records
            .iter()
            .filter(|r| r.field(kind) == name)
            .map(|r| r.id)
            .collect()
    }

    /// Delete every record whose `kind` field equals `name`; returns how many went.
    pub fn remove_referencing(&mut self, kind: ReferenceKind, name: &str) -> LedgerResult<usize> {
        let next: Vec<PurchaseRecord> = self
            .records
            .iter()
            .filter(|r| r.field(kind) != name)
            .cloned()
            .collect();
        let removed = self.records.len() - next.len();
        if removed > 0 {
            self.commit(next)?;
        }
        Ok(removed)
    }

    /// Point every record naming `from` at `to`, recomputing amounts since a
    /// renamed country can change currency. Returns how many changed.
    pub fn rename_referencing(
        &mut self,
        kind: ReferenceKind,
        from: &str,
        to: &str,
    ) -> LedgerResult<usize> {
        let mut next = self.records.clone();
        let mut renamed = 0;
        for r in next.iter_mut().filter(|r| r.field(kind) == from) {
            let mut draft = r.to_draft();
            *draft.field_mut(kind) = to.to_string();
            *r = self.build(r.id, draft)?;
            renamed += 1;
        }
        if renamed > 0 {
            self.commit(next)?;
        }
        Ok(renamed)
    }

    /// Total quantity per ticker, ascending by ticker. Sums are `u128` so no
    /// number of `u64` quantities can overflow them.
    pub fn aggregate_by_ticker(&self) -> BTreeMap<String, u128> {
        let mut out = BTreeMap::new();
        for r in &self.records {
            *out.entry(r.ticker.clone()).or_insert(0) += u128::from(r.quantity);
        }
        out
    }

    pub fn total_quantity(&self) -> u128 {
        self.records.iter().map(|r| u128::from(r.quantity)).sum()
    }
}
