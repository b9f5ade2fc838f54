// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Transaction;
use crate::store::{SqliteStore, TxFilter};
use crate::utils::{fmt_money, Period};
use anyhow::{Context, Result};

pub fn handle(store: &SqliteStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(store, sub),
        _ => Ok(()),
    }
}

fn export_transactions(store: &SqliteStore, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();

    let mut filter = TxFilter::default();
    if let Some(m) = sub.get_one::<String>("month") {
        let p = Period::parse(m)?;
        filter.from = Some(p.first_day()?);
        filter.to = Some(p.last_day()?);
    }
    let mut txs = store.list_transactions(&filter)?;
    // oldest first in files
    txs.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));

    match fmt.as_str() {
        "csv" => write_csv(out, &txs)?,
        "json" => {
            std::fs::write(out, serde_json::to_string_pretty(&txs)?)
                .with_context(|| format!("Write {}", out))?;
        }
        _ => anyhow::bail!("Unknown format: {} (use csv|json)", fmt),
    }
    log::info!("exported {} transactions to {}", txs.len(), out);
    println!("Exported {} transactions to {}", txs.len(), out);
    Ok(())
}

fn write_csv(out: &str, txs: &[Transaction]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(out).with_context(|| format!("Create {}", out))?;
    wtr.write_record([
        "id", "date", "type", "status", "amount", "account", "to_account", "category", "card",
        "description",
    ])?;
    for t in txs {
        let date = t.date.to_string();
        let amount = fmt_money(&t.amount);
        wtr.write_record([
            t.id.as_str(),
            date.as_str(),
            t.r#type.as_str(),
            t.status.as_str(),
            amount.as_str(),
            t.account_name.as_deref().unwrap_or_default(),
            t.to_account_name.as_deref().unwrap_or_default(),
            t.category_name.as_deref().unwrap_or_default(),
            t.credit_card_name.as_deref().unwrap_or_default(),
            t.description.as_deref().unwrap_or_default(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
