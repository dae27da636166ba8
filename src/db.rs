// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use log::warn;
use once_cell::sync::Lazy;
use rusqlite::{Connection, ErrorCode, params};
use std::fs;
use std::path::{Path, PathBuf};

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Stockledger", "stockledger"));

pub const DB_FILE: &str = "stockledger.sqlite";

pub const DEFAULT_COUNTRIES: [&str; 4] = ["대한민국", "미국", "일본", "중국"];

/// Platform data dir, or `override_dir` when given. Created on demand.
pub fn data_dir(override_dir: Option<&Path>) -> Result<PathBuf> {
    let dir = match override_dir {
        Some(d) => d.to_path_buf(),
        None => ProjectDirs::from(APP.0, APP.1, APP.2)
            .context("Could not determine platform-specific data dir")?
            .data_dir()
            .to_path_buf(),
    };
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create data dir {}", dir.display()))?;
    Ok(dir)
}

pub fn db_path(dir: &Path) -> PathBuf {
    dir.join(DB_FILE)
}

/// Open the database, resetting it to a fresh schema if the file is not a database.
pub fn open_or_init(dir: &Path) -> Result<Connection> {
    let path = db_path(dir);
    match open_and_migrate(&path) {
        Ok(conn) => Ok(conn),
        Err(e) if is_corrupt(&e) => {
            warn!(
                "database {} is unreadable ({}); starting from an empty one",
                path.display(),
                e
            );
            fs::remove_file(&path)
                .with_context(|| format!("Remove corrupt DB at {}", path.display()))?;
            open_and_migrate(&path).with_context(|| format!("Open DB at {}", path.display()))
        }
        Err(e) => Err(e).with_context(|| format!("Open DB at {}", path.display())),
    }
}

fn open_and_migrate(path: &Path) -> rusqlite::Result<Connection> {
    let conn = Connection::open(path)?;
    init_schema(&conn)?;
    Ok(conn)
}

fn is_corrupt(e: &rusqlite::Error) -> bool {
    matches!(
        e.sqlite_error_code(),
        Some(ErrorCode::NotADatabase) | Some(ErrorCode::DatabaseCorrupt)
    )
}

pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS purchase(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        date TEXT NOT NULL,
        country TEXT NOT NULL,
        broker TEXT NOT NULL,
        account TEXT NOT NULL,
        stock TEXT NOT NULL,
        ticker TEXT NOT NULL,
        price TEXT NOT NULL,
        quantity INTEGER NOT NULL CHECK(quantity >= 0),
        dollar_amount TEXT,
        won_amount TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_purchase_ticker ON purchase(ticker);

    CREATE TABLE IF NOT EXISTS country(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE
    );

    CREATE TABLE IF NOT EXISTS broker(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE
    );

    CREATE TABLE IF NOT EXISTS account_number(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE
    );

    CREATE TABLE IF NOT EXISTS stock_name(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE
    );

    CREATE TABLE IF NOT EXISTS ticker_name(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE
    );
    "#,
    )?;

    let seeded: i64 = conn.query_row("SELECT COUNT(*) FROM country", [], |r| r.get(0))?;
    if seeded == 0 {
        for name in DEFAULT_COUNTRIES {
            conn.execute(
                "INSERT OR IGNORE INTO country(name) VALUES (?1)",
                params![name],
            )?;
        }
    }
    Ok(())
}
