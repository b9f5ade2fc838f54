// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Like `parse_decimal` but refuses values below zero.
pub fn parse_amount(s: &str) -> Result<Decimal> {
    let d = parse_decimal(s)?;
    if d < Decimal::ZERO {
        anyhow::bail!("Amount must not be negative ({})", d);
    }
    Ok(d)
}

pub fn fmt_money(d: &Decimal) -> String {
    format!("{:.2}", d.round_dp(2))
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(anyhow::anyhow!("Invalid month number {}", month));
        }
        Ok(Self { year, month })
    }

    /// Parse `YYYY-MM`.
    pub fn parse(s: &str) -> Result<Self> {
        let d = NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
            .with_context(|| format!("Invalid month '{}', expected YYYY-MM", s))?;
        Ok(Self {
            year: d.year(),
            month: d.month(),
        })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn first_day(&self) -> Result<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .ok_or_else(|| anyhow::anyhow!("Invalid month '{}'", self))
    }

    pub fn last_day(&self) -> Result<NaiveDate> {
        let last_day = match self.month {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            2 => {
                if NaiveDate::from_ymd_opt(self.year, 2, 29).is_some() {
                    29
                } else {
                    28
                }
            }
            m => return Err(anyhow::anyhow!("Invalid month number {}", m)),
        };
        NaiveDate::from_ymd_opt(self.year, self.month, last_day)
            .ok_or_else(|| anyhow::anyhow!("Invalid month '{}'", self))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // Arrays stream one element per line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn previous_wraps_year() {
        let p = Period::parse("2025-01").unwrap();
        assert_eq!(p.previous(), Period::new(2024, 12).unwrap());
        assert_eq!(Period::parse("2025-07").unwrap().previous().to_string(), "2025-06");
    }

    #[test]
    fn last_day_handles_leap_years() {
        assert_eq!(
            Period::new(2024, 2).unwrap().last_day().unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert_eq!(
            Period::new(2025, 2).unwrap().last_day().unwrap(),
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()
        );
    }

    #[test]
    fn rejects_bad_months() {
        assert!(Period::parse("2025-13").is_err());
        assert!(Period::new(2025, 0).is_err());
    }

    #[test]
    fn negative_amount_rejected() {
        assert!(parse_amount("-1").is_err());
        assert_eq!(parse_amount(" 12.50 ").unwrap().to_string(), "12.50");
    }
}
