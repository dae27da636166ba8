// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

use crate::models::ReferenceKind;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("No record with id {0}")]
    NotFound(i64),

    #[error("No watch list row {0}")]
    RowNotFound(usize),

    #[error("{kind} '{name}' already exists")]
    DuplicateReference { kind: ReferenceKind, name: String },

    #[error("{0} name must not be empty")]
    EmptyName(ReferenceKind),

    #[error("Unknown {kind} '{name}' (add it with `ref add`)")]
    UnknownReference { kind: ReferenceKind, name: String },

    #[error("{kind} '{name}' is used by {count} purchase record(s)")]
    ReferenceInUse {
        kind: ReferenceKind,
        name: String,
        count: usize,
    },

    #[error("Invalid {field} '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Invalid ticker code '{0}', expected 6 digits")]
    InvalidCode(String),

    #[error("Invalid value '{value}' for setting '{key}'")]
    InvalidSetting { key: String, value: String },

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Failure while reading a persisted store.
#[derive(Error, Debug)]
pub enum LoadError {
    /// Content exists but cannot be parsed; the store should be reset.
    #[error("Corrupt store: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        LoadError::Other(e.into())
    }
}

impl From<rusqlite::Error> for LedgerError {
    fn from(e: rusqlite::Error) -> Self {
        LedgerError::Storage(e.into())
    }
}

pub type LedgerResult<T> = std::result::Result<T, LedgerError>;
