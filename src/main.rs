// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use finora::config::{self, Config};
use finora::store::SqliteStore;
use finora::{cli, commands, db};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or(config::LOG_ENV, "warn"))
        .init();

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let cfg = Config::from_env()?.with_owner(matches.get_one::<String>("user"));
    let conn = db::open_or_init(&cfg.db_path)?;
    log::debug!("using {} as '{}'", cfg.db_path.display(), cfg.owner);
    let store = SqliteStore::new(&conn, cfg.owner.clone());

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", cfg.db_path.display());
        }
        Some(("account", sub)) => commands::accounts::handle(&store, sub)?,
        Some(("category", sub)) => commands::categories::handle(&store, sub)?,
        Some(("card", sub)) => commands::cards::handle(&store, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&store, sub)?,
        Some(("report", sub)) => commands::reports::handle(&store, sub)?,
        Some(("goal", sub)) => commands::goals::handle(&store, sub)?,
        Some(("salary", sub)) => commands::salary::handle(&store, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&store, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
