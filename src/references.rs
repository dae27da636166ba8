// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Controlled vocabularies (countries, brokers, accounts, stock names, tickers).

use log::info;
use rusqlite::{Connection, ErrorCode, OptionalExtension, params};

use crate::config::ReferencePolicy;
use crate::error::{LedgerError, LedgerResult};
use crate::ledger::Ledger;
use crate::models::{ReferenceItem, ReferenceKind};
use crate::storage::PurchaseStore;

/// Trimmed, upper-cased entry name.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_uppercase()
}

pub struct ReferenceBook<'c> {
    conn: &'c Connection,
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    e.sqlite_error_code() == Some(ErrorCode::ConstraintViolation)
}

impl<'c> ReferenceBook<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        ReferenceBook { conn }
    }

    pub fn list(&self, kind: ReferenceKind) -> LedgerResult<Vec<ReferenceItem>> {
        let sql = format!("SELECT id, name FROM {} ORDER BY id", kind.table());
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], |r| {
            Ok(ReferenceItem {
                id: r.get(0)?,
                name: r.get(1)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn find(&self, kind: ReferenceKind, id: i64) -> LedgerResult<ReferenceItem> {
        let sql = format!("SELECT id, name FROM {} WHERE id=?1", kind.table());
        self.conn
            .query_row(&sql, params![id], |r| {
                Ok(ReferenceItem {
                    id: r.get(0)?,
                    name: r.get(1)?,
                })
            })
            .optional()?
            .ok_or(LedgerError::NotFound(id))
    }

    pub fn contains(&self, kind: ReferenceKind, name: &str) -> LedgerResult<bool> {
        let sql = format!("SELECT 1 FROM {} WHERE name=?1", kind.table());
        let hit: Option<i64> = self
            .conn
            .query_row(&sql, params![name], |r| r.get(0))
            .optional()?;
        Ok(hit.is_some())
    }

    pub fn add(&self, kind: ReferenceKind, name: &str) -> LedgerResult<i64> {
        let name = normalize_name(name);
        if name.is_empty() {
            return Err(LedgerError::EmptyName(kind));
        }
        let sql = format!("INSERT INTO {}(name) VALUES (?1)", kind.table());
        match self.conn.execute(&sql, params![name]) {
            Ok(_) => Ok(self.conn.last_insert_rowid()),
            Err(e) if is_unique_violation(&e) => Err(LedgerError::DuplicateReference { kind, name }),
            Err(e) => Err(e.into()),
        }
    }

    pub fn rename(&self, kind: ReferenceKind, id: i64, name: &str) -> LedgerResult<()> {
        let name = normalize_name(name);
        if name.is_empty() {
            return Err(LedgerError::EmptyName(kind));
        }
        let sql = format!("UPDATE {} SET name=?1 WHERE id=?2", kind.table());
        match self.conn.execute(&sql, params![name, id]) {
            Ok(0) => Err(LedgerError::NotFound(id)),
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(LedgerError::DuplicateReference { kind, name }),
            Err(e) => Err(e.into()),
        }
    }

    pub fn remove(&self, kind: ReferenceKind, id: i64) -> LedgerResult<()> {
        let sql = format!("DELETE FROM {} WHERE id=?1", kind.table());
        match self.conn.execute(&sql, params![id])? {
            0 => Err(LedgerError::NotFound(id)),
            _ => Ok(()),
        }
    }

    /// Accepts any value while the list for `kind` is empty.
    pub fn validate(&self, kind: ReferenceKind, value: &str) -> LedgerResult<()> {
        let sql = format!("SELECT COUNT(*) FROM {}", kind.table());
        let n: i64 = self.conn.query_row(&sql, [], |r| r.get(0))?;
        if n == 0 || self.contains(kind, value)? {
            Ok(())
        } else {
            Err(LedgerError::UnknownReference {
                kind,
                name: value.to_string(),
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveOutcome {
    pub item: ReferenceItem,
    /// Purchase records that still name the removed item.
    pub dangling: usize,
    /// Purchase records deleted along with it.
    pub cascaded: usize,
}

/// Delete a reference item, applying `policy` to the purchase records naming it.
pub fn remove_with_policy<S: PurchaseStore>(
    book: &ReferenceBook<'_>,
    ledger: &mut Ledger<S>,
    kind: ReferenceKind,
    id: i64,
    policy: ReferencePolicy,
) -> LedgerResult<RemoveOutcome> {
    let item = book.find(kind, id)?;
    let users = ledger.references_to(kind, &item.name).len();

    match policy {
        ReferencePolicy::Restrict if users > 0 => Err(LedgerError::ReferenceInUse {
            kind,
            name: item.name,
            count: users,
        }),
        ReferencePolicy::Cascade => {
            let cascaded = ledger.remove_referencing(kind, &item.name)?;
            book.remove(kind, id)?;
            info!("removed {} '{}' and {} purchase(s)", kind, item.name, cascaded);
            Ok(RemoveOutcome {
                item,
                dangling: 0,
                cascaded,
            })
        }
        ReferencePolicy::Restrict | ReferencePolicy::Detach => {
            book.remove(kind, id)?;
            Ok(RemoveOutcome {
                item,
                dangling: users,
                cascaded: 0,
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameOutcome {
    pub old_name: String,
    pub item: ReferenceItem,
    /// Purchase records left naming the old spelling.
    pub dangling: usize,
    /// Purchase records moved to the new name.
    pub updated: usize,
}

/// Rename a reference item. `restrict` refuses while purchases name it and
/// `cascade` carries the new name into those purchases.
pub fn rename_with_policy<S: PurchaseStore>(
    book: &ReferenceBook<'_>,
    ledger: &mut Ledger<S>,
    kind: ReferenceKind,
    id: i64,
    name: &str,
    policy: ReferencePolicy,
) -> LedgerResult<RenameOutcome> {
    let old = book.find(kind, id)?;
    let users = ledger.references_to(kind, &old.name).len();
    if policy == ReferencePolicy::Restrict && users > 0 {
        return Err(LedgerError::ReferenceInUse {
            kind,
            name: old.name,
            count: users,
        });
    }

    book.rename(kind, id, name)?;
    let item = book.find(kind, id)?;
    let updated = match policy {
        ReferencePolicy::Cascade if item.name != old.name => {
            match ledger.rename_referencing(kind, &old.name, &item.name) {
                Ok(n) => n,
                Err(e) => {
                    book.rename(kind, id, &old.name)?;
                    return Err(e);
                }
            }
        }
        _ => 0,
    };
    if updated > 0 {
        info!(
            "renamed {} '{}' to '{}' in {} purchase(s)",
            kind, old.name, item.name, updated
        );
    }
    Ok(RenameOutcome {
        dangling: if item.name == old.name { 0 } else { users - updated },
        old_name: old.name,
        item,
        updated,
    })
}
