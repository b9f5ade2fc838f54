// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod accounts;
pub mod categories;
pub mod cards;
pub mod transactions;
pub mod reports;
pub mod goals;
pub mod salary;
pub mod exporter;

use crate::utils::Period;
use anyhow::Result;

/// `--month` if given, otherwise the month containing today.
pub(crate) fn month_or_current(sub: &clap::ArgMatches) -> Result<Period> {
    match sub.get_one::<String>("month") {
        Some(m) => Period::parse(m),
        None => Ok(Period::containing(chrono::Local::now().date_naive())),
    }
}
