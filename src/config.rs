// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Application settings, stored as key/value rows in the `settings` table.

use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::LedgerError;

pub const DEFAULT_DOMESTIC_COUNTRY: &str = "대한민국";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Sqlite,
    Csv,
    Json,
}

/// What happens to purchase records when a reference item they name is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferencePolicy {
    /// Delete the item; records keep the dangling name.
    Detach,
    /// Refuse while any record names the item.
    Restrict,
    /// Delete the item and every record naming it.
    Cascade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TableStyle {
    Utf8,
    Ascii,
}

impl TableStyle {
    pub fn preset(self) -> &'static str {
        match self {
            TableStyle::Utf8 => comfy_table::presets::UTF8_FULL,
            TableStyle::Ascii => comfy_table::presets::ASCII_FULL,
        }
    }
}

macro_rules! setting_enum {
    ($ty:ty, $key:literal, { $($s:literal => $v:expr),+ $(,)? }) => {
        impl FromStr for $ty {
            type Err = LedgerError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($s => Ok($v),)+
                    other => Err(LedgerError::InvalidSetting {
                        key: $key.to_string(),
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                $(if *self == $v { return f.write_str($s); })+
                Ok(())
            }
        }
    };
}

setting_enum!(Backend, "backend", {
    "sqlite" => Backend::Sqlite,
    "csv" => Backend::Csv,
    "json" => Backend::Json,
});

setting_enum!(ReferencePolicy, "reference_delete", {
    "detach" => ReferencePolicy::Detach,
    "restrict" => ReferencePolicy::Restrict,
    "cascade" => ReferencePolicy::Cascade,
});

setting_enum!(TableStyle, "table_style", {
    "utf8" => TableStyle::Utf8,
    "ascii" => TableStyle::Ascii,
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppConfig {
    pub domestic_country: String,
    pub backend: Backend,
    pub reference_delete: ReferencePolicy,
    pub table_style: TableStyle,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            domestic_country: DEFAULT_DOMESTIC_COUNTRY.to_string(),
            backend: Backend::Sqlite,
            reference_delete: ReferencePolicy::Detach,
            table_style: TableStyle::Utf8,
        }
    }
}

pub const KEYS: [&str; 4] = ["domestic_country", "backend", "reference_delete", "table_style"];

impl AppConfig {
    pub fn load(conn: &Connection) -> Result<AppConfig> {
        let mut cfg = AppConfig::default();
        for key in KEYS {
            if let Some(v) = get_setting(conn, key)? {
                cfg.apply(key, &v)?;
            }
        }
        Ok(cfg)
    }

    /// Validate and apply one setting in memory.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), LedgerError> {
        match key {
            "domestic_country" => {
                let v = value.trim();
                if v.is_empty() {
                    return Err(LedgerError::InvalidSetting {
                        key: key.to_string(),
                        value: value.to_string(),
                    });
                }
                self.domestic_country = v.to_uppercase();
            }
            "backend" => self.backend = value.parse()?,
            "reference_delete" => self.reference_delete = value.parse()?,
            "table_style" => self.table_style = value.parse()?,
            _ => {
                return Err(LedgerError::InvalidSetting {
                    key: key.to_string(),
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "domestic_country" => Some(self.domestic_country.clone()),
            "backend" => Some(self.backend.to_string()),
            "reference_delete" => Some(self.reference_delete.to_string()),
            "table_style" => Some(self.table_style.to_string()),
            _ => None,
        }
    }

    /// Validate, then persist one setting.
    pub fn set(&mut self, conn: &Connection, key: &str, value: &str) -> Result<()> {
        self.apply(key, value)?;
        let stored = self.get(key).unwrap_or_default();
        conn.execute(
            "INSERT INTO settings(key, value) VALUES(?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value=excluded.value",
            params![key, stored],
        )?;
        Ok(())
    }
}

fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}
