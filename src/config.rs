// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use std::env;
use std::path::PathBuf;

pub const DB_ENV: &str = "FINORA_DB";
pub const USER_ENV: &str = "FINORA_USER";
pub const LOG_ENV: &str = "FINORA_LOG";

/// Owner used when no identity has been supplied.
pub const LOCAL_OWNER: &str = "local";

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub owner: String,
}

impl Config {
    /// Resolve from the environment, falling back to the platform data dir.
    pub fn from_env() -> Result<Self> {
        let db_path = match env::var(DB_ENV) {
            Ok(p) if !p.trim().is_empty() => PathBuf::from(p),
            _ => crate::db::default_db_path()?,
        };
        let owner = match env::var(USER_ENV) {
            Ok(u) if !u.trim().is_empty() => u.trim().to_string(),
            _ => LOCAL_OWNER.to_string(),
        };
        Ok(Self { db_path, owner })
    }

    /// A `--user` flag wins over the environment.
    pub fn with_owner(mut self, owner: Option<&String>) -> Self {
        if let Some(o) = owner.map(|o| o.trim()).filter(|o| !o.is_empty()) {
            self.owner = o.to_string();
        }
        self
    }
}

pub fn get_setting(conn: &Connection, owner: &str, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE owner_id=?1 AND key=?2",
            params![owner, key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, owner: &str, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(owner_id, key, value) VALUES(?1, ?2, ?3)
         ON CONFLICT(owner_id, key) DO UPDATE SET value=excluded.value",
        params![owner, key, value],
    )?;
    Ok(())
}

pub fn get_salary(conn: &Connection, owner: &str) -> Result<Option<Decimal>> {
    match get_setting(conn, owner, "salary")? {
        Some(s) => {
            let d = s
                .parse::<Decimal>()
                .with_context(|| format!("Invalid stored salary '{}'", s))?;
            Ok(Some(d))
        }
        None => Ok(None),
    }
}

pub fn set_salary(conn: &Connection, owner: &str, salary: Decimal) -> Result<()> {
    if salary < Decimal::ZERO {
        anyhow::bail!("Salary must not be negative ({})", salary);
    }
    set_setting(conn, owner, "salary", &salary.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn salary_round_trips_per_owner() {
        let conn = crate::db::open_in_memory().unwrap();
        assert_eq!(get_salary(&conn, "u1").unwrap(), None);
        set_salary(&conn, "u1", Decimal::from(5000)).unwrap();
        set_salary(&conn, "u1", Decimal::from(5200)).unwrap();
        assert_eq!(get_salary(&conn, "u1").unwrap(), Some(Decimal::from(5200)));
        assert_eq!(get_salary(&conn, "u2").unwrap(), None);
    }

    #[test]
    fn negative_salary_rejected() {
        let conn = crate::db::open_in_memory().unwrap();
        assert!(set_salary(&conn, "u1", Decimal::from(-1)).is_err());
    }

    #[test]
    fn flag_overrides_owner() {
        let cfg = Config {
            db_path: PathBuf::from("x.sqlite"),
            owner: LOCAL_OWNER.into(),
        };
        let cfg = cfg.with_owner(Some(&" alice ".to_string()));
        assert_eq!(cfg.owner, "alice");
    }
}
