// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.alphavelocity", "Finora", "finora"));

pub fn default_db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("finora.sqlite"))
}

pub fn open_or_init(path: &Path) -> Result<Connection> {
    let conn =
        Connection::open(path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    log::debug!("database ready at {}", path.display());
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("Open in-memory DB")?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        owner_id TEXT NOT NULL,
        key TEXT NOT NULL,
        value TEXT NOT NULL,
        PRIMARY KEY(owner_id, key)
    );

    CREATE TABLE IF NOT EXISTS accounts(
        id TEXT PRIMARY KEY,
        owner_id TEXT NOT NULL,
        name TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS categories(
        id TEXT PRIMARY KEY,
        owner_id TEXT NOT NULL,
        name TEXT NOT NULL,
        icon TEXT
    );

    CREATE TABLE IF NOT EXISTS credit_cards(
        id TEXT PRIMARY KEY,
        owner_id TEXT NOT NULL,
        name TEXT NOT NULL,
        icon TEXT,
        color TEXT,
        credit_limit TEXT NOT NULL DEFAULT '0',
        due_day INTEGER NOT NULL CHECK(due_day BETWEEN 1 AND 31),
        current_used TEXT NOT NULL DEFAULT '0'
    );

    -- Names are display caches of the linked rows; ids are not foreign keys
    -- so a dangling id degrades to a stale name instead of a failed write.
    CREATE TABLE IF NOT EXISTS transactions(
        id TEXT PRIMARY KEY,
        owner_id TEXT NOT NULL,
        type TEXT NOT NULL CHECK(type IN ('expense','income','transfer')),
        amount TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'completed'
            CHECK(status IN ('completed','cancelled','pending')),
        date TEXT NOT NULL,
        description TEXT,
        account_id TEXT,
        account_name TEXT,
        category_id TEXT,
        category_name TEXT,
        category_icon TEXT,
        to_account_id TEXT,
        to_account_name TEXT,
        credit_card_id TEXT,
        credit_card_name TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(owner_id, date);
    CREATE INDEX IF NOT EXISTS idx_transactions_card ON transactions(credit_card_id);

    CREATE TABLE IF NOT EXISTS goals(
        id TEXT PRIMARY KEY,
        owner_id TEXT NOT NULL,
        name TEXT NOT NULL,
        target_amount TEXT NOT NULL,
        current_amount TEXT NOT NULL DEFAULT '0',
        timeframe TEXT NOT NULL CHECK(timeframe IN ('short','medium','long')),
        icon TEXT
    );
    "#,
    )?;
    Ok(())
}
