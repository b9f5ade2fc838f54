// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::cards::{self, BillStatus, CardUsage};
use crate::models::CreditCard;
use crate::store::{Collection, EntityStore, Record, SqliteStore};
use crate::utils::{fmt_money, maybe_print_json, new_id, parse_decimal, pretty_table};
use anyhow::{Context, Result};
use chrono::Datelike;
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(store: &SqliteStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(store, sub)?,
        Some(("list", sub)) => list(store, sub)?,
        Some(("recompute", sub)) => recompute(store, sub)?,
        Some(("bill", sub)) => bill(store, sub)?,
        Some(("rm", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            store
                .delete(Collection::CreditCards, id)
                .with_context(|| format!("Remove card '{}'", id))?;
            println!("Removed card '{}'", id);
        }
        _ => {}
    }
    Ok(())
}

fn add(store: &SqliteStore, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap().trim().to_string();
    let limit = parse_decimal(sub.get_one::<String>("limit").unwrap())?;
    let due_day = *sub.get_one::<u32>("due-day").unwrap();
    cards::validate(limit, due_day)?;
    let card = CreditCard {
        id: sub.get_one::<String>("id").cloned().unwrap_or_else(new_id),
        name,
        icon: sub.get_one::<String>("icon").cloned(),
        color: sub.get_one::<String>("color").cloned(),
        limit,
        due_day,
        current_used: Decimal::ZERO,
    };
    store.insert_card(&card)?;
    println!(
        "Added card '{}' ({}) limit {} due day {}",
        card.name,
        card.id,
        fmt_money(&card.limit),
        card.due_day
    );
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRow {
    pub card: CreditCard,
    pub usage: CardUsage,
    pub bill: BillStatus,
}

pub fn card_rows(store: &SqliteStore, day_of_month: u32) -> Result<Vec<CardRow>> {
    let mut out = Vec::new();
    for card in store.list_cards()? {
        out.push(CardRow {
            usage: cards::usage(&card)?,
            bill: cards::bill_status(&card, day_of_month),
            card,
        });
    }
    Ok(out)
}

fn list(store: &SqliteStore, sub: &clap::ArgMatches) -> Result<()> {
    let today = chrono::Local::now().date_naive().day();
    let data = card_rows(store, today)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|r| {
                vec![
                    r.card.id.clone(),
                    r.card.name.clone(),
                    fmt_money(&r.card.limit),
                    fmt_money(&r.usage.used),
                    fmt_money(&r.usage.available),
                    format!("{:.0}%", r.usage.usage_percent),
                    format!("{:?}", r.usage.alert).to_lowercase(),
                    format!("day {}", r.card.due_day),
                    format!("{:?}", r.bill).to_lowercase(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Card", "Limit", "Used", "Available", "Usage", "Alert", "Due", "Bill"],
                rows,
            )
        );
    }
    Ok(())
}

fn recompute(store: &SqliteStore, sub: &clap::ArgMatches) -> Result<()> {
    let ids: Vec<String> = match sub.get_one::<String>("id") {
        Some(id) => vec![id.clone()],
        None => store.list_cards()?.into_iter().map(|c| c.id).collect(),
    };
    for id in ids {
        match cards::sync_used(store, &id)? {
            Some(used) => println!("Card '{}' used = {}", id, fmt_money(&used)),
            None => println!("Card '{}' not found", id),
        }
    }
    Ok(())
}

fn bill(store: &SqliteStore, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").unwrap();
    let period = super::month_or_current(sub)?;
    let Record::CreditCard(card) = store.get(Collection::CreditCards, id)? else {
        anyhow::bail!("'{}' is not a credit card", id);
    };
    let txs = store.transactions_for_card(id)?;
    let bill = cards::bill_for(id, period, &txs)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &bill)? {
        let rows = vec![vec![
            format!("{} {}", card.name, bill.period),
            fmt_money(&bill.total),
            if bill.paid { "paid" } else { "open" }.to_string(),
        ]];
        println!("{}", pretty_table(&["Bill", "Total", "Status"], rows));
    }
    Ok(())
}
