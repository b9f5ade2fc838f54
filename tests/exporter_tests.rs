// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use finora::models::{Account, Category, Transaction, TxType};
use finora::store::SqliteStore;
use finora::{cli, commands::exporter, db, ledger};
use rusqlite::Connection;
use rust_decimal::Decimal;
use tempfile::tempdir;

fn base_conn() -> Connection {
    let conn = db::open_in_memory().unwrap();
    let s = SqliteStore::new(&conn, "local");
    s.insert_account(&Account {
        id: "acc1".into(),
        name: "Checking".into(),
    })
    .unwrap();
    s.insert_category(&Category {
        id: "cat1".into(),
        name: "Groceries".into(),
        icon: None,
    })
    .unwrap();
    for (id, date) in [("t1", (2025, 1, 2)), ("t2", (2025, 2, 9))] {
        let mut tx = Transaction::new(
            id,
            TxType::Expense,
            Decimal::new(1234, 2),
            NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
        );
        tx.account_id = Some("acc1".into());
        tx.category_id = Some("cat1".into());
        tx.description = Some("Weekly run".into());
        ledger::create_transaction(&s, tx).unwrap();
    }
    conn
}

fn run_export(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["finora", "export", "transactions"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    let store = SqliteStore::new(conn, "local");
    match matches.subcommand() {
        Some(("export", export_m)) => exporter::handle(&store, export_m),
        _ => panic!("no export subcommand"),
    }
}

#[test]
fn export_transactions_writes_pretty_json() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.json");
    let out_str = out_path.to_string_lossy().to_string();

    run_export(&conn, &["--format", "json", "--out", &out_str, "--month", "2025-01"]).unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    let items = parsed.as_array().unwrap();
    assert_eq!(items.len(), 1);
    let t = &items[0];
    assert_eq!(t["id"], "t1");
    assert_eq!(t["type"], "expense");
    assert_eq!(t["date"], "2025-01-02");
    assert_eq!(t["amount"], "12.34");
    assert_eq!(t["accountName"], "Checking");
    assert_eq!(t["categoryName"], "Groceries");
    assert_eq!(t["description"], "Weekly run");
}

#[test]
fn export_transactions_writes_csv_oldest_first() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.csv");
    let out_str = out_path.to_string_lossy().to_string();

    run_export(&conn, &["--format", "csv", "--out", &out_str]).unwrap();

    let mut rdr = csv::Reader::from_path(&out_path).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(&headers[0], "id");
    assert_eq!(&headers[4], "amount");
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][0], "t1");
    assert_eq!(&rows[1][0], "t2");
    assert_eq!(&rows[0][4], "12.34");
    assert_eq!(&rows[0][5], "Checking");
    assert_eq!(&rows[0][7], "Groceries");
}

#[test]
fn export_transactions_rejects_bad_month() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.json");
    let out_str = out_path.to_string_lossy().to_string();

    assert!(run_export(&conn, &["--format", "json", "--out", &out_str, "--month", "2025-13"]).is_err());
    assert!(!out_path.exists());
}
