// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod purchases;
pub mod references;
pub mod settings;
pub mod watch;

use anyhow::Result;
use rusqlite::Connection;
use std::path::PathBuf;

use crate::config::{AppConfig, Backend};
use crate::ledger::Ledger;
use crate::storage::{CsvStore, JsonStore, PurchaseStore, SqliteStore, csv_file, json_file};
use crate::watchlist::{self, WatchList};

/// Everything a command needs: the open database, settings and data directory.
pub struct Context {
    pub conn: Connection,
    pub config: AppConfig,
    pub data_dir: PathBuf,
}

pub type BoxedStore<'c> = Box<dyn PurchaseStore + 'c>;

impl Context {
    pub fn new(conn: Connection, data_dir: PathBuf) -> Result<Self> {
        let config = AppConfig::load(&conn)?;
        Ok(Context {
            conn,
            config,
            data_dir,
        })
    }

    pub fn store(&self) -> BoxedStore<'_> {
        match self.config.backend {
            Backend::Sqlite => Box::new(SqliteStore::new(&self.conn)),
            Backend::Csv => Box::new(CsvStore::new(self.data_dir.join(csv_file::FILE_NAME))),
            Backend::Json => Box::new(JsonStore::new(self.data_dir.join(json_file::FILE_NAME))),
        }
    }

    pub fn ledger(&self) -> Result<Ledger<BoxedStore<'_>>> {
        Ledger::open(self.store(), &self.config.domestic_country)
    }

    pub fn watchlist(&self) -> Result<WatchList> {
        WatchList::open(self.data_dir.join(watchlist::FILE_NAME))
    }
}
