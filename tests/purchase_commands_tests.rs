// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rust_decimal::Decimal;
use stockledger::cli::build_cli;
use stockledger::commands::{Context, purchases};
use stockledger::db;
use stockledger::error::LedgerError;
use tempfile::{TempDir, tempdir};

fn setup() -> (TempDir, Context) {
    let dir = tempdir().unwrap();
    let conn = db::open_or_init(dir.path()).unwrap();
    let ctx = Context::new(conn, dir.path().to_path_buf()).unwrap();
    (dir, ctx)
}

fn run(ctx: &Context, args: &[&str]) -> Result<()> {
    let argv = ["stockledger", "purchase"].into_iter().chain(args.iter().copied());
    let m = build_cli().try_get_matches_from(argv).unwrap();
    let (_, sub) = m.subcommand().unwrap();
    purchases::handle(ctx, sub)
}

fn add(ctx: &Context, country: &str, ticker: &str, price: &str, qty: &str) -> Result<()> {
    run(
        ctx,
        &[
            "add",
            "--date",
            "2024-03-04",
            "--country",
            country,
            "--broker",
            "삼성증권",
            "--account",
            "123-45-678",
            "--stock",
            "Sample",
            "--ticker",
            ticker,
            "--price",
            price,
            "--quantity",
            qty,
        ],
    )
}

fn ledger_error(err: &anyhow::Error) -> &LedgerError {
    err.downcast_ref::<LedgerError>().expect("ledger error")
}

#[test]
fn domestic_purchase_records_won_amount() {
    let (_dir, ctx) = setup();
    add(&ctx, "대한민국", "005930", "70,000", "10").unwrap();

    let ledger = ctx.ledger().unwrap();
    let r = ledger.get(1).unwrap();
    assert_eq!(r.amount_krw(), Some(Decimal::from(700_000)));
    assert_eq!(r.amount_usd(), None);
    assert_eq!(r.stock_name, "SAMPLE");
}

#[test]
fn foreign_purchase_records_dollar_amount() {
    let (_dir, ctx) = setup();
    add(&ctx, "미국", "aapl", "185.5", "1,000").unwrap();

    let ledger = ctx.ledger().unwrap();
    let r = ledger.get(1).unwrap();
    assert_eq!(r.ticker, "AAPL");
    assert_eq!(r.quantity, 1000);
    assert_eq!(r.amount_usd(), Some(Decimal::from(185_500)));
    assert_eq!(r.amount_krw(), None);
}

#[test]
fn update_keeps_omitted_fields_and_recomputes_amount() {
    let (_dir, ctx) = setup();
    add(&ctx, "대한민국", "005930", "70000", "10").unwrap();

    run(&ctx, &["update", "1", "--quantity", "20"]).unwrap();
    let ledger = ctx.ledger().unwrap();
    let r = ledger.get(1).unwrap();
    assert_eq!(r.quantity, 20);
    assert_eq!(r.broker, "삼성증권");
    assert_eq!(r.amount_krw(), Some(Decimal::from(1_400_000)));

    // Moving the purchase abroad flips the currency.
    run(&ctx, &["update", "1", "--country", "미국"]).unwrap();
    let ledger = ctx.ledger().unwrap();
    let r = ledger.get(1).unwrap();
    assert_eq!(r.amount_krw(), None);
    assert_eq!(r.amount_usd(), Some(Decimal::from(1_400_000)));
}

#[test]
fn missing_ids_are_reported() {
    let (_dir, ctx) = setup();
    add(&ctx, "대한민국", "005930", "70000", "10").unwrap();

    let err = run(&ctx, &["rm", "99"]).unwrap_err();
    assert!(matches!(ledger_error(&err), LedgerError::NotFound(99)));
    let err = run(&ctx, &["update", "42", "--quantity", "1"]).unwrap_err();
    assert!(matches!(ledger_error(&err), LedgerError::NotFound(42)));
    assert_eq!(ctx.ledger().unwrap().list().len(), 1);
}

#[test]
fn ids_are_not_reused_after_removing_the_last_but_one() {
    let (_dir, ctx) = setup();
    add(&ctx, "대한민국", "005930", "70000", "1").unwrap();
    add(&ctx, "대한민국", "000660", "131000", "1").unwrap();
    run(&ctx, &["rm", "1"]).unwrap();
    add(&ctx, "대한민국", "035420", "200000", "1").unwrap();

    let ids: Vec<i64> = ctx.ledger().unwrap().list().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![2, 3]);
}

#[test]
fn unknown_country_is_rejected_once_list_is_seeded() {
    let (_dir, ctx) = setup();
    let err = add(&ctx, "독일", "SAP", "120", "1").unwrap_err();
    assert!(matches!(
        ledger_error(&err),
        LedgerError::UnknownReference { name, .. } if name == "독일"
    ));
    assert!(ctx.ledger().unwrap().list().is_empty());
}

#[test]
fn malformed_numbers_are_rejected_without_writing() {
    let (_dir, ctx) = setup();
    let err = add(&ctx, "대한민국", "005930", "abc", "10").unwrap_err();
    assert!(matches!(
        ledger_error(&err),
        LedgerError::InvalidNumber { field: "price", .. }
    ));
    let err = add(&ctx, "대한민국", "005930", "70000", "2.5").unwrap_err();
    assert!(matches!(
        ledger_error(&err),
        LedgerError::InvalidNumber { field: "quantity", .. }
    ));
    assert!(ctx.ledger().unwrap().list().is_empty());
}

#[test]
fn summary_sums_quantities_per_ticker() {
    let (_dir, ctx) = setup();
    add(&ctx, "미국", "AAPL", "180", "5").unwrap();
    add(&ctx, "대한민국", "005930", "70000", "10").unwrap();
    add(&ctx, "미국", "AAPL", "190", "7").unwrap();

    let s = purchases::summarize(&ctx).unwrap();
    let tickers: Vec<(&str, u128)> = s.by_ticker.iter().map(|(t, q)| (t.as_str(), *q)).collect();
    assert_eq!(tickers, vec![("005930", 10), ("AAPL", 12)]);
    assert_eq!(s.total, 22);

    run(&ctx, &["summary"]).unwrap();
    run(&ctx, &["summary", "--json"]).unwrap();
}

#[test]
fn listing_and_preview_do_not_write() {
    let (_dir, ctx) = setup();
    add(&ctx, "대한민국", "005930", "70000", "10").unwrap();

    run(&ctx, &["list"]).unwrap();
    run(&ctx, &["list", "--jsonl"]).unwrap();
    run(&ctx, &["show", "1"]).unwrap();
    run(&ctx, &["preview", "--country", "미국", "--price", "1.5", "--quantity", "2"]).unwrap();
    run(&ctx, &["preview", "--country", "미국", "--price", "x"]).unwrap();

    assert_eq!(ctx.ledger().unwrap().list().len(), 1);
}

#[test]
fn csv_backend_keeps_purchases_out_of_the_database() {
    let (dir, mut ctx) = setup();
    ctx.config.apply("backend", "csv").unwrap();
    add(&ctx, "대한민국", "005930", "70000", "10").unwrap();

    let text = std::fs::read_to_string(dir.path().join("purchases.csv")).unwrap();
    assert!(text.contains("005930"));
    assert!(text.contains("\"₩700,000\""));

    let n: i64 = ctx
        .conn
        .query_row("SELECT COUNT(*) FROM purchase", [], |r| r.get(0))
        .unwrap();
    assert_eq!(n, 0);

    ctx.config.apply("backend", "json").unwrap();
    assert!(ctx.ledger().unwrap().list().is_empty());
}

#[test]
fn amounts_too_large_to_represent_are_rejected() {
    let (_dir, ctx) = setup();
    let err = add(&ctx, "대한민국", "005930", "100,000,000,000", "18446744073709551615")
        .unwrap_err();
    assert!(matches!(
        ledger_error(&err),
        LedgerError::InvalidNumber { field: "amount", .. }
    ));
    assert!(ctx.ledger().unwrap().list().is_empty());

    run(
        &ctx,
        &[
            "preview",
            "--country",
            "대한민국",
            "--price",
            "100,000,000,000",
            "--quantity",
            "18446744073709551615",
        ],
    )
    .unwrap();
}

#[test]
fn summary_total_exceeds_u64_without_wrapping() {
    let (_dir, mut ctx) = setup();
    ctx.config.apply("backend", "json").unwrap();
    add(&ctx, "미국", "AAPL", "0", "18446744073709551615").unwrap();
    add(&ctx, "미국", "AAPL", "0", "1").unwrap();

    let s = purchases::summarize(&ctx).unwrap();
    assert_eq!(s.total, u128::from(u64::MAX) + 1);
    assert_eq!(s.by_ticker["AAPL"], s.total);
    run(&ctx, &["summary"]).unwrap();
}
