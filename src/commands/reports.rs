// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::month_or_current;
use crate::cards;
use crate::config;
use crate::report::{self, MonthlyReport, ReportInput};
use crate::store::SqliteStore;
use crate::utils::{fmt_money, maybe_print_json, pretty_table, Period};
use anyhow::Result;
use serde::Serialize;

pub fn handle(store: &SqliteStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("month", sub)) => month(store, sub)?,
        Some(("categories", sub)) => categories(store, sub)?,
        _ => {}
    }
    Ok(())
}

/// Fetch what the aggregator needs and build the report for `period`.
pub fn monthly_report(store: &SqliteStore, period: Period) -> Result<MonthlyReport> {
    let current = store.transactions_between(period.first_day()?, period.last_day()?)?;
    let prev = period.previous();
    let previous = store.transactions_between(prev.first_day()?, prev.last_day()?)?;
    let salary = config::get_salary(store.conn(), store.owner())?;
    let usage = cards::total_usage(&store.list_cards()?)?;
    let r = report::build(ReportInput {
        period,
        current: &current,
        previous: &previous,
        salary,
        total_credit_card_usage: usage,
    })?;
    Ok(r)
}

fn month(store: &SqliteStore, sub: &clap::ArgMatches) -> Result<()> {
    let period = month_or_current(sub)?;
    let r = monthly_report(store, period)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &r)? {
        return Ok(());
    }
    let delta = r.delta();
    let debt = match r.debt_percentage_display() {
        Some(p) if r.debt_alert() => format!("{:.1}% (high)", p),
        Some(p) => format!("{:.1}%", p),
        None => "-".to_string(),
    };
    let rows = vec![
        vec!["Income".into(), fmt_money(&r.income)],
        vec!["Expense".into(), fmt_money(&r.expense)],
        vec!["  debit".into(), fmt_money(&r.debit_expenses)],
        vec!["  credit".into(), fmt_money(&r.credit_expenses)],
        vec!["Balance".into(), fmt_money(&r.balance)],
        vec![
            format!("Balance {}", r.previous_month.period),
            fmt_money(&r.previous_month.balance),
        ],
        vec![
            "Change".into(),
            format!(
                "{} ({})",
                fmt_money(&delta.delta),
                if delta.improved { "better" } else { "not better" }
            ),
        ],
        vec!["Card usage".into(), fmt_money(&r.total_credit_card_usage)],
        vec!["Debt / salary".into(), debt],
    ];
    let title = r.period.to_string();
    println!("{}", pretty_table(&[title.as_str(), "Amount"], rows));
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CategoryReport {
    period: Period,
    categories: Vec<report::CategorySpend>,
    insight: Option<String>,
}

fn categories(store: &SqliteStore, sub: &clap::ArgMatches) -> Result<()> {
    let period = month_or_current(sub)?;
    let txs = store.transactions_between(period.first_day()?, period.last_day()?)?;
    let totals = report::totals(&txs)?;
    let ranking = report::top_categories(&txs)?;
    let insight = report::category_insight(&ranking, totals.expense).map(|i| i.to_string());
    let out = CategoryReport {
        period,
        categories: ranking,
        insight,
    };
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &out)? {
        let rows = out
            .categories
            .iter()
            .map(|c| vec![c.category_name.clone(), fmt_money(&c.total)])
            .collect();
        println!("{}", pretty_table(&["Category", "Spent"], rows));
        match &out.insight {
            Some(i) => println!("{}", i),
            None => println!("No expenses recorded for {}", period),
        }
    }
    Ok(())
}
