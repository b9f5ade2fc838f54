// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::ReportError;
use crate::models::Goal;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

pub fn progress_percent(goal: &Goal) -> Result<Decimal, ReportError> {
    if goal.target_amount > Decimal::ZERO {
        goal.current_amount
            .checked_div(goal.target_amount)
            .and_then(|q| q.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or(ReportError::Overflow("goal progress"))
    } else {
        Ok(Decimal::ZERO)
    }
}

pub fn remaining(goal: &Goal) -> Decimal {
    (goal.target_amount - goal.current_amount).max(Decimal::ZERO)
}

/// Nudge shown next to a goal, based on progress and this month's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Guidance {
    Achieved,
    AlmostThere,
    Advancing,
    ReduceSpending,
    KeepPositive,
}

pub fn guidance(progress: Decimal, month_balance: Decimal) -> Guidance {
    if progress >= Decimal::ONE_HUNDRED {
        Guidance::Achieved
    } else if month_balance > Decimal::ZERO {
        if progress >= Decimal::from(75) {
            Guidance::AlmostThere
        } else {
            Guidance::Advancing
        }
    } else if month_balance < Decimal::ZERO {
        Guidance::ReduceSpending
    } else {
        Guidance::KeepPositive
    }
}

impl fmt::Display for Guidance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Guidance::Achieved => "Goal reached. Time to celebrate and set a new one.",
            Guidance::AlmostThere => {
                "This month's positive balance brought you even closer. You're almost there!"
            }
            Guidance::Advancing => "This month's positive balance moved your goal forward. Keep it up!",
            Guidance::ReduceSpending => {
                "Cutting spending and growing your balance can speed up this goal."
            }
            Guidance::KeepPositive => "Keeping a positive balance every month gets you there faster.",
        };
        f.write_str(msg)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalStatus {
    pub goal: Goal,
    pub progress_percent: Decimal,
    pub remaining: Decimal,
    pub guidance: Guidance,
}

pub fn status(goal: &Goal, month_balance: Decimal) -> Result<GoalStatus, ReportError> {
    let progress = progress_percent(goal)?;
    Ok(GoalStatus {
        goal: goal.clone(),
        progress_percent: progress,
        remaining: remaining(goal),
        guidance: guidance(progress, month_balance),
    })
}
