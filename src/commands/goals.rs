// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::month_or_current;
use crate::goals;
use crate::models::{Goal, GoalTimeframe};
use crate::report;
use crate::store::{Collection, EntityStore, FieldMap, FieldValue, Record, SqliteStore};
use crate::utils::{fmt_money, maybe_print_json, new_id, parse_amount, pretty_table};
use anyhow::{Context, Result};
use rust_decimal::Decimal;

pub fn handle(store: &SqliteStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(store, sub)?,
        Some(("list", sub)) => list(store, sub)?,
        Some(("contribute", sub)) => contribute(store, sub)?,
        Some(("rm", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            store
                .delete(Collection::Goals, id)
                .with_context(|| format!("Remove goal '{}'", id))?;
            println!("Removed goal '{}'", id);
        }
        _ => {}
    }
    Ok(())
}

fn add(store: &SqliteStore, sub: &clap::ArgMatches) -> Result<()> {
    let timeframe: GoalTimeframe = sub.get_one::<String>("timeframe").unwrap().parse()?;
    let current = match sub.get_one::<String>("current") {
        Some(c) => parse_amount(c)?,
        None => Decimal::ZERO,
    };
    let goal = Goal {
        id: sub.get_one::<String>("id").cloned().unwrap_or_else(new_id),
        name: sub.get_one::<String>("name").unwrap().trim().to_string(),
        target_amount: parse_amount(sub.get_one::<String>("target").unwrap())?,
        current_amount: current,
        timeframe,
        icon: sub.get_one::<String>("icon").cloned(),
    };
    store.insert_goal(&goal)?;
    println!(
        "Added goal '{}' ({}) target {} {}",
        goal.name,
        goal.id,
        fmt_money(&goal.target_amount),
        goal.timeframe.label().to_lowercase()
    );
    Ok(())
}

fn list(store: &SqliteStore, sub: &clap::ArgMatches) -> Result<()> {
    let period = month_or_current(sub)?;
    let txs = store.transactions_between(period.first_day()?, period.last_day()?)?;
    let balance = report::totals(&txs)?.balance;
    let data = store
        .list_goals()?
        .iter()
        .map(|g| goals::status(g, balance))
        .collect::<Result<Vec<_>, _>>()?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|s| {
                vec![
                    s.goal.id.clone(),
                    s.goal.name.clone(),
                    format!("{} ({})", s.goal.timeframe.label(), s.goal.timeframe.description()),
                    fmt_money(&s.goal.current_amount),
                    fmt_money(&s.remaining),
                    format!("{:.0}%", s.progress_percent.min(Decimal::ONE_HUNDRED)),
                    s.guidance.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Goal", "Timeframe", "Saved", "Remaining", "Progress", "Tip"],
                rows,
            )
        );
    }
    Ok(())
}

fn contribute(store: &SqliteStore, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").unwrap();
    let amount = parse_amount(sub.get_one::<String>("amount").unwrap())?;
    let Record::Goal(goal) = store.get(Collection::Goals, id)? else {
        anyhow::bail!("'{}' is not a goal", id);
    };
    let total = goal
        .current_amount
        .checked_add(amount)
        .ok_or_else(|| anyhow::anyhow!("Contribution of {} is too large for goal '{}'", amount, id))?;
    let mut fields = FieldMap::new();
    fields.insert("current_amount", FieldValue::Decimal(total));
    store.update(Collection::Goals, id, &fields)?;
    println!(
        "Goal '{}' now at {} of {}",
        goal.name,
        fmt_money(&total),
        fmt_money(&goal.target_amount)
    );
    Ok(())
}
