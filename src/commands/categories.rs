// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Category;
use crate::store::{Collection, EntityStore, SqliteStore};
use crate::utils::{maybe_print_json, new_id, pretty_table};
use anyhow::{Context, Result};

pub fn handle(store: &SqliteStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim().to_string();
            let icon = sub.get_one::<String>("icon").cloned();
            let id = sub.get_one::<String>("id").cloned().unwrap_or_else(new_id);
            store.insert_category(&Category {
                id: id.clone(),
                name: name.clone(),
                icon,
            })?;
            println!("Added category '{}' ({})", name, id);
        }
        Some(("list", sub)) => {
            let data = store.list_categories()?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .into_iter()
                    .map(|c| vec![c.id, c.name, c.icon.unwrap_or_default()])
                    .collect();
                println!("{}", pretty_table(&["Id", "Category", "Icon"], rows));
            }
        }
        Some(("rm", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            store
                .delete(Collection::Categories, id)
                .with_context(|| format!("Remove category '{}'", id))?;
            println!("Removed category '{}'", id);
        }
        _ => {}
    }
    Ok(())
}
