// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use finora::commands::reports;
use finora::error::ReportError;
use finora::models::{CreditCard, Transaction, TxStatus, TxType};
use finora::store::SqliteStore;
use finora::utils::Period;
use finora::{config, db, ledger};
use rust_decimal::Decimal;

fn tx(id: &str, kind: TxType, amount: i64, date: (i32, u32, u32)) -> Transaction {
    Transaction::new(
        id,
        kind,
        Decimal::from(amount),
        NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
    )
}

#[test]
fn monthly_report_from_store() {
    let conn = db::open_in_memory().unwrap();
    let s = SqliteStore::new(&conn, "local");
    s.insert_card(&CreditCard {
        id: "card1".into(),
        name: "Visa".into(),
        icon: None,
        color: None,
        limit: Decimal::from(5000),
        due_day: 10,
        current_used: Decimal::ZERO,
    })
    .unwrap();
    config::set_salary(&conn, "local", Decimal::from(5000)).unwrap();

    // March: balance 500
    ledger::create_transaction(&s, tx("m1", TxType::Income, 2000, (2025, 3, 5))).unwrap();
    ledger::create_transaction(&s, tx("m2", TxType::Expense, 1500, (2025, 3, 9))).unwrap();

    // April
    ledger::create_transaction(&s, tx("a1", TxType::Income, 5000, (2025, 4, 1))).unwrap();
    ledger::create_transaction(&s, tx("a2", TxType::Expense, 1900, (2025, 4, 2))).unwrap();
    let mut card = tx("a3", TxType::Expense, 1600, (2025, 4, 3));
    card.credit_card_id = Some("card1".into());
    ledger::create_transaction(&s, card).unwrap();
    let mut cancelled = tx("a4", TxType::Expense, 999, (2025, 4, 4));
    cancelled.status = TxStatus::Cancelled;
    ledger::create_transaction(&s, cancelled).unwrap();

    let r = reports::monthly_report(&s, Period::new(2025, 4).unwrap()).unwrap();
    assert_eq!(r.income, Decimal::from(5000));
    assert_eq!(r.expense, Decimal::from(3500));
    assert_eq!(r.debit_expenses, Decimal::from(1900));
    assert_eq!(r.credit_expenses, Decimal::from(1600));
    assert_eq!(r.balance, Decimal::from(1500));
    assert_eq!(r.total_credit_card_usage, Decimal::from(1600));
    assert_eq!(r.debt_percentage, Decimal::from(32));
    assert!(r.debt_alert());
    assert_eq!(r.previous_month.balance, Decimal::from(500));
    let delta = r.delta();
    assert_eq!(delta.delta, Decimal::from(1000));
    assert!(delta.improved);
}

#[test]
fn report_without_salary_hides_debt_ratio() {
    let conn = db::open_in_memory().unwrap();
    let s = SqliteStore::new(&conn, "local");
    ledger::create_transaction(&s, tx("a1", TxType::Expense, 100, (2025, 1, 15))).unwrap();

    let r = reports::monthly_report(&s, Period::new(2025, 1).unwrap()).unwrap();
    assert_eq!(r.salary, None);
    assert_eq!(r.debt_percentage, Decimal::ZERO);
    assert_eq!(r.debt_percentage_display(), None);
    assert_eq!(r.previous_month.period, Period::new(2024, 12).unwrap());
    assert_eq!(r.balance, Decimal::from(-100));
    assert!(!r.delta().improved);
}

#[test]
fn tiny_salary_fails_the_report_instead_of_crashing() {
    let conn = db::open_in_memory().unwrap();
    let s = SqliteStore::new(&conn, "local");
    s.insert_card(&CreditCard {
        id: "card1".into(),
        name: "Visa".into(),
        icon: None,
        color: None,
        limit: Decimal::from(5000),
        due_day: 10,
        current_used: Decimal::ZERO,
    })
    .unwrap();
    let mut charge = tx("a1", TxType::Expense, 1_000_000, (2025, 4, 2));
    charge.credit_card_id = Some("card1".into());
    ledger::create_transaction(&s, charge).unwrap();
    config::set_salary(&conn, "local", Decimal::new(1, 28)).unwrap();

    let err = reports::monthly_report(&s, Period::new(2025, 4).unwrap()).unwrap_err();
    assert_eq!(
        err.downcast_ref::<ReportError>(),
        Some(&ReportError::Overflow("debt percentage"))
    );
}
