// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use super::PurchaseStore;
use crate::error::LoadError;
use crate::models::{PurchaseRecord, PurchaseRow};

pub const FILE_NAME: &str = "purchases.json";

pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonStore { path: path.into() }
    }
}

impl PurchaseStore for JsonStore {
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
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Read {}", self.path.display()))?;
        if raw.trim().is_empty() {
            return Err(LoadError::Corrupt("empty file".into()));
        }
        serde_json::from_str(&raw).map_err(|e| LoadError::Corrupt(e.to_string()))
    }

    fn save(&self, records: &[PurchaseRecord]) -> Result<()> {
        let rows: Vec<PurchaseRow> = records.iter().cloned().map(PurchaseRow::from).collect();
        fs::write(&self.path, serde_json::to_string_pretty(&rows)?)
            .with_context(|| format!("Write {}", self.path.display()))?;
        Ok(())
    }
}
