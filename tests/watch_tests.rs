// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};
use rust_decimal::Decimal;
use std::cell::Cell;
use std::fs;
use stockledger::cli::build_cli;
use stockledger::commands::{Context, watch};
use stockledger::db;
use stockledger::error::LedgerError;
use stockledger::quotes::{QuoteProvider, QuoteSnapshot};
use tempfile::{TempDir, tempdir};

struct Fixed {
    calls: Cell<usize>,
}

impl Fixed {
    fn new() -> Self {
        Fixed {
            calls: Cell::new(0),
        }
    }
}

impl QuoteProvider for Fixed {
    fn lookup(&self, code: &str) -> Result<QuoteSnapshot> {
        self.calls.set(self.calls.get() + 1);
        Ok(QuoteSnapshot {
            name: format!("Listed {}", code),
            price_1yr: Decimal::from(60_000),
            price_6mo: Decimal::from(65_000),
            current: Decimal::from(90_000),
        })
    }
}

struct Offline;

impl QuoteProvider for Offline {
    fn lookup(&self, _code: &str) -> Result<QuoteSnapshot> {
        bail!("connection refused")
    }
}

fn setup() -> (TempDir, Context) {
    let dir = tempdir().unwrap();
    let conn = db::open_or_init(dir.path()).unwrap();
    let ctx = Context::new(conn, dir.path().to_path_buf()).unwrap();
    (dir, ctx)
}

fn run(ctx: &Context, provider: &dyn QuoteProvider, args: &[&str]) -> Result<()> {
    let argv = ["stockledger", "watch"].into_iter().chain(args.iter().copied());
    let m = build_cli().try_get_matches_from(argv).unwrap();
    let (_, sub) = m.subcommand().unwrap();
    watch::handle(ctx, sub, provider)
}

#[test]
fn fetch_keeps_prices_given_on_the_command_line() {
    let (dir, ctx) = setup();
    let provider = Fixed::new();
    run(
        &ctx,
        &provider,
        &["add", "--ticker", "005930", "--current", "80,000", "--fetch"],
    )
    .unwrap();
    assert_eq!(provider.calls.get(), 1);

    let wl = ctx.watchlist().unwrap();
    let e = wl.get(1).unwrap();
    assert_eq!(e.name, "Listed 005930");
    assert_eq!(e.price_1yr, Some(Decimal::from(60_000)));
    assert_eq!(e.price_6mo, Some(Decimal::from(65_000)));
    assert_eq!(e.current_price, Some(Decimal::from(80_000)));

    let raw = fs::read_to_string(dir.path().join("watchlist.json")).unwrap();
    assert!(raw.contains("80,000 원"));
}

#[test]
fn fetch_refreshes_an_existing_row() {
    let (_dir, ctx) = setup();
    let provider = Fixed::new();
    run(
        &ctx,
        &provider,
        &[
            "add",
            "--ticker",
            "005930",
            "--name",
            "old name",
            "--price-1yr",
            "1",
            "--price-6mo",
            "2",
            "--current",
            "3",
        ],
    )
    .unwrap();
    assert_eq!(provider.calls.get(), 0);

    run(&ctx, &provider, &["update", "1", "--fetch"]).unwrap();
    let wl = ctx.watchlist().unwrap();
    let e = wl.get(1).unwrap();
    assert_eq!(e.name, "Listed 005930");
    assert_eq!(e.price_1yr, Some(Decimal::from(60_000)));
    assert_eq!(e.price_6mo, Some(Decimal::from(65_000)));
    assert_eq!(e.current_price, Some(Decimal::from(90_000)));

    run(&ctx, &Offline, &["update", "1", "--fetch"]).unwrap();
    let wl = ctx.watchlist().unwrap();
    assert_eq!(wl.get(1).unwrap().current_price, Some(Decimal::from(90_000)));
}

#[test]
fn failed_lookup_leaves_entry_as_typed() {
    let (_dir, ctx) = setup();
    run(
        &ctx,
        &Offline,
        &["add", "--ticker", "000660", "--name", "하이닉스", "--fetch"],
    )
    .unwrap();

    let wl = ctx.watchlist().unwrap();
    let e = wl.get(1).unwrap();
    assert_eq!(e.name, "하이닉스");
    assert_eq!(e.price_1yr, None);
    assert_eq!(e.current_price, None);
}

#[test]
fn non_domestic_codes_are_never_looked_up() {
    let (_dir, ctx) = setup();
    let provider = Fixed::new();
    run(&ctx, &provider, &["add", "--ticker", "AAPL", "--fetch"]).unwrap();
    assert_eq!(provider.calls.get(), 0);

    let err = run(&ctx, &provider, &["quote", "12345"]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<LedgerError>(),
        Some(LedgerError::InvalidCode(_))
    ));
    assert_eq!(provider.calls.get(), 0);
}

#[test]
fn update_and_remove_address_rows_from_one() {
    let (_dir, ctx) = setup();
    let provider = Fixed::new();
    run(&ctx, &provider, &["add", "--ticker", "005930"]).unwrap();
    run(&ctx, &provider, &["add", "--ticker", "000660"]).unwrap();

    run(&ctx, &provider, &["update", "2", "--current", "131000"]).unwrap();
    let wl = ctx.watchlist().unwrap();
    assert_eq!(wl.get(2).unwrap().ticker, "000660");
    assert_eq!(wl.get(2).unwrap().current_price, Some(Decimal::from(131_000)));

    for args in [["update", "3"], ["rm", "0"]] {
        let err = run(&ctx, &provider, &args).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LedgerError>(),
            Some(LedgerError::RowNotFound(_))
        ));
    }

    run(&ctx, &provider, &["rm", "1"]).unwrap();
    let wl = ctx.watchlist().unwrap();
    assert_eq!(wl.list().len(), 1);
    assert_eq!(wl.get(1).unwrap().ticker, "000660");
}

#[test]
fn bad_price_text_is_rejected() {
    let (_dir, ctx) = setup();
    let err = run(&ctx, &Offline, &["add", "--ticker", "005930", "--current", "lots"]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<LedgerError>(),
        Some(LedgerError::InvalidNumber { field: "current", .. })
    ));
    let err = run(&ctx, &Offline, &["add", "--ticker", "005930", "--price-6mo=-5"]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<LedgerError>(),
        Some(LedgerError::InvalidNumber { field: "price-6mo", .. })
    ));
    assert!(ctx.watchlist().unwrap().list().is_empty());
}

#[test]
fn corrupt_watch_file_starts_empty() {
    let (dir, ctx) = setup();
    fs::write(dir.path().join("watchlist.json"), "{ nope").unwrap();
    assert!(ctx.watchlist().unwrap().list().is_empty());
    assert_eq!(
        fs::read_to_string(dir.path().join("watchlist.json")).unwrap().trim(),
        "[]"
    );
}
