// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditCard {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub limit: Decimal,
    pub due_day: u32,
    /// Snapshot of the outstanding amount, recomputed from transactions.
    pub current_used: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxType {
    Expense,
    Income,
    Transfer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Completed,
    Cancelled,
    Pending,
}

impl TxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxType::Expense => "expense",
            TxType::Income => "income",
            TxType::Transfer => "transfer",
        }
    }
}

impl TxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxStatus::Completed => "completed",
            TxStatus::Cancelled => "cancelled",
            TxStatus::Pending => "pending",
        }
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "expense" => Ok(TxType::Expense),
            "income" => Ok(TxType::Income),
            "transfer" => Ok(TxType::Transfer),
            other => Err(anyhow::anyhow!(
                "Invalid transaction type '{}', expected expense|income|transfer",
                other
            )),
        }
    }
}

impl FromStr for TxStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "completed" => Ok(TxStatus::Completed),
            "cancelled" => Ok(TxStatus::Cancelled),
            "pending" => Ok(TxStatus::Pending),
            other => Err(anyhow::anyhow!(
                "Invalid status '{}', expected completed|cancelled|pending",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub r#type: TxType,
    pub amount: Decimal,
    pub status: TxStatus,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub account_id: Option<String>,
    pub account_name: Option<String>,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
    pub category_icon: Option<String>,
    pub to_account_id: Option<String>,
    pub to_account_name: Option<String>,
    pub credit_card_id: Option<String>,
    pub credit_card_name: Option<String>,
}

impl Transaction {
    /// A bare record with no links; names are filled in on insert.
    pub fn new(id: impl Into<String>, r#type: TxType, amount: Decimal, date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            r#type,
            amount,
            status: TxStatus::Completed,
            date,
            description: None,
            account_id: None,
            account_name: None,
            category_id: None,
            category_name: None,
            category_icon: None,
            to_account_id: None,
            to_account_name: None,
            credit_card_id: None,
            credit_card_name: None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == TxStatus::Cancelled
    }

    pub fn is_card_expense(&self) -> bool {
        self.r#type == TxType::Expense && self.credit_card_id.as_deref().is_some_and(|c| !c.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalTimeframe {
    Short,
    Medium,
    Long,
}

impl GoalTimeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalTimeframe::Short => "short",
            GoalTimeframe::Medium => "medium",
            GoalTimeframe::Long => "long",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GoalTimeframe::Short => "Short term",
            GoalTimeframe::Medium => "Medium term",
            GoalTimeframe::Long => "Long term",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            GoalTimeframe::Short => "up to 1 year",
            GoalTimeframe::Medium => "1 to 5 years",
            GoalTimeframe::Long => "more than 5 years",
        }
    }
}

impl FromStr for GoalTimeframe {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "short" => Ok(GoalTimeframe::Short),
            "medium" => Ok(GoalTimeframe::Medium),
            "long" => Ok(GoalTimeframe::Long),
            other => Err(anyhow::anyhow!(
                "Invalid timeframe '{}', expected short|medium|long",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub name: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub timeframe: GoalTimeframe,
    pub icon: Option<String>,
}
