// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::{self, WriteOutcome};
use crate::models::{Transaction, TxStatus, TxType};
use crate::reconcile::TransactionPatch;
use crate::store::{SqliteStore, TxFilter};
use crate::utils::{
    fmt_money, maybe_print_json, new_id, parse_amount, parse_date, pretty_table, Period,
};
use anyhow::{Context, Result};
use serde_json::{json, Value};

pub fn handle(store: &SqliteStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(store, sub)?,
        Some(("list", sub)) => list(store, sub)?,
        Some(("update", sub)) => update(store, sub)?,
        Some(("rm", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            let cards = ledger::delete_transaction(store, id)
                .with_context(|| format!("Remove transaction '{}'", id))?;
            println!("Removed transaction '{}'", id);
            for (card, used) in cards {
                println!("Card '{}' used is now {}", card, fmt_money(&used));
            }
        }
        _ => {}
    }
    Ok(())
}

fn opt(sub: &clap::ArgMatches, name: &str) -> Option<String> {
    sub.get_one::<String>(name).cloned()
}

fn add(store: &SqliteStore, sub: &clap::ArgMatches) -> Result<()> {
    let kind: TxType = sub.get_one::<String>("type").unwrap().parse()?;
    let amount = parse_amount(sub.get_one::<String>("amount").unwrap())?;
    let date = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?,
        None => chrono::Local::now().date_naive(),
    };
    let mut tx = Transaction::new(opt(sub, "id").unwrap_or_else(new_id), kind, amount, date);
    if let Some(s) = sub.get_one::<String>("status") {
        tx.status = s.parse::<TxStatus>()?;
    }
    tx.description = opt(sub, "description");
    tx.account_id = opt(sub, "account");
    tx.category_id = opt(sub, "category");
    tx.to_account_id = opt(sub, "to-account");
    tx.credit_card_id = opt(sub, "card");

    let out = ledger::create_transaction(store, tx)?;
    println!(
        "Recorded {} {} on {} ({})",
        out.transaction.r#type,
        fmt_money(&out.transaction.amount),
        out.transaction.date,
        out.transaction.id
    );
    report_side_effects(&out);
    Ok(())
}

/// Merge `--patch` JSON with the individual field flags; flags win.
pub fn patch_from_args(sub: &clap::ArgMatches) -> Result<TransactionPatch> {
    let mut payload: Value = match sub.get_one::<String>("patch") {
        Some(s) => serde_json::from_str(s).context("--patch is not valid JSON")?,
        None => json!({}),
    };
    let obj = payload
        .as_object_mut()
        .ok_or_else(|| anyhow::anyhow!("--patch must be a JSON object"))?;
    for (flag, key) in [
        ("type", "type"),
        ("amount", "amount"),
        ("status", "status"),
        ("date", "date"),
        ("description", "description"),
        ("account", "accountId"),
        ("category", "categoryId"),
        ("to-account", "toAccountId"),
        ("card", "creditCardId"),
    ] {
        if let Some(v) = sub.get_one::<String>(flag) {
            obj.insert(key.to_string(), Value::String(v.clone()));
        }
    }
    TransactionPatch::from_json(&payload)
}

fn update(store: &SqliteStore, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").unwrap();
    let patch = patch_from_args(sub)?;
    if patch.is_empty() {
        anyhow::bail!("Nothing to update for transaction '{}'", id);
    }
    let out = ledger::update_transaction(store, id, &patch)
        .with_context(|| format!("Update transaction '{}'", id))?;
    println!("Updated transaction '{}'", id);
    report_side_effects(&out);
    Ok(())
}

fn report_side_effects(out: &WriteOutcome) {
    for link in out.stale_links() {
        println!(
            "warning: could not resolve {:?} link; cached name left as is",
            link
        );
    }
    for (card, used) in &out.cards {
        println!("Card '{}' used is now {}", card, fmt_money(used));
    }
}

pub fn query_rows(store: &SqliteStore, sub: &clap::ArgMatches) -> Result<Vec<Transaction>> {
    let mut filter = TxFilter {
        account_id: opt(sub, "account"),
        credit_card_id: opt(sub, "card"),
        limit: sub.get_one::<usize>("limit").copied(),
        ..TxFilter::default()
    };
    if let Some(m) = sub.get_one::<String>("month") {
        let p = Period::parse(m)?;
        filter.from = Some(p.first_day()?);
        filter.to = Some(p.last_day()?);
    }
    Ok(store.list_transactions(&filter)?)
}

fn list(store: &SqliteStore, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(store, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|t| {
                let account = match (&t.account_name, &t.to_account_name) {
                    (Some(a), Some(to)) => format!("{} -> {}", a, to),
                    (Some(a), None) => a.clone(),
                    (None, Some(to)) => format!("-> {}", to),
                    (None, None) => String::new(),
                };
                vec![
                    t.date.to_string(),
                    t.id.clone(),
                    t.r#type.to_string(),
                    t.status.to_string(),
                    fmt_money(&t.amount),
                    account,
                    t.category_name.clone().unwrap_or_default(),
                    t.credit_card_name.clone().unwrap_or_default(),
                    t.description.clone().unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &[
                    "Date", "Id", "Type", "Status", "Amount", "Account", "Category", "Card",
                    "Description"
                ],
                rows,
            )
        );
    }
    Ok(())
}
