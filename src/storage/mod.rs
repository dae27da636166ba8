// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Purchase persistence. Every backend is read in full on open and rewritten
//! in full on each mutation.

pub mod csv_file;
pub mod json_file;
pub mod sqlite;

use anyhow::Result;

use crate::error::LoadError;
use crate::models::{PurchaseRecord, PurchaseRow};

pub use csv_file::CsvStore;
pub use json_file::JsonStore;
pub use sqlite::SqliteStore;

pub trait PurchaseStore {
    /// Human readable location, used in log lines.
    fn describe(&self) -> String;

    /// Whether anything has been persisted yet.
    fn exists(&self) -> bool {
        true
    }

    fn load(&self) -> Result<Vec<PurchaseRow>, LoadError>;

    fn save(&self, records: &[PurchaseRecord]) -> Result<()>;
}

impl<S: PurchaseStore + ?Sized> PurchaseStore for Box<S> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn exists(&self) -> bool {
        (**self).exists()
    }

    fn load(&self) -> Result<Vec<PurchaseRow>, LoadError> {
        (**self).load()
    }

    fn save(&self, records: &[PurchaseRecord]) -> Result<()> {
        (**self).save(records)
    }
}
