// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Account;
use crate::store::{Collection, EntityStore, FieldMap, FieldValue, SqliteStore};
use crate::utils::{maybe_print_json, new_id, pretty_table};
use anyhow::{Context, Result};

pub fn handle(store: &SqliteStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim().to_string();
            let id = sub.get_one::<String>("id").cloned().unwrap_or_else(new_id);
            store.insert_account(&Account {
                id: id.clone(),
                name: name.clone(),
            })?;
            println!("Added account '{}' ({})", name, id);
        }
        Some(("list", sub)) => {
            let data = store.list_accounts()?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data.into_iter().map(|a| vec![a.id, a.name]).collect();
                println!("{}", pretty_table(&["Id", "Name"], rows));
            }
        }
        Some(("rename", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            let name = sub.get_one::<String>("name").unwrap().trim().to_string();
            let mut fields = FieldMap::new();
            fields.insert("name", FieldValue::Text(name.clone()));
            store
                .update(Collection::Accounts, id, &fields)
                .with_context(|| format!("Rename account '{}'", id))?;
            println!("Renamed account '{}' to '{}'", id, name);
        }
        Some(("rm", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            store
                .delete(Collection::Accounts, id)
                .with_context(|| format!("Remove account '{}'", id))?;
            println!("Removed account '{}'", id);
        }
        _ => {}
    }
    Ok(())
}
