// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config;
use crate::store::SqliteStore;
use crate::utils::{fmt_money, parse_decimal};
use anyhow::Result;

pub fn handle(store: &SqliteStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => {
            let salary = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
            config::set_salary(store.conn(), store.owner(), salary)?;
            println!("Salary set to {}", fmt_money(&salary));
        }
        Some(("show", _)) => match config::get_salary(store.conn(), store.owner())? {
            Some(s) => println!("{}", fmt_money(&s)),
            None => println!("No salary set"),
        },
        _ => {}
    }
    Ok(())
}
