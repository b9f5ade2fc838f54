// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use thiserror::Error;

/// Failures coming back from the entity store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{collection} '{id}' not found")]
    NotFound { collection: &'static str, id: String },

    #[error("{collection} has no writable field '{field}'")]
    UnknownField {
        collection: &'static str,
        field: &'static str,
    },

    #[error("invalid stored value for {field}: {value}")]
    Corrupt { field: &'static str, value: String },

    #[error("rejected update: {0}")]
    Rejected(String),

    #[error(transparent)]
    Card(#[from] CardError),

    #[error("store error: {0}")]
    Sql(#[from] rusqlite::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Rejected aggregation input. Reports are never built from these.
#[derive(Debug, Error, PartialEq)]
pub enum ReportError {
    #[error("transaction '{id}' has a negative amount ({amount})")]
    NegativeAmount { id: String, amount: Decimal },

    #[error("salary must not be negative ({0})")]
    NegativeSalary(Decimal),

    #[error("credit card usage must not be negative ({0})")]
    NegativeUsage(Decimal),

    #[error("amounts too large to compute {0}")]
    Overflow(&'static str),
}

#[derive(Debug, Error, PartialEq)]
pub enum CardError {
    #[error("credit card limit must not be negative ({0})")]
    NegativeLimit(Decimal),

    #[error("due day must be between 1 and 31, got {0}")]
    InvalidDueDay(u32),

    #[error("amounts on credit card '{0}' are too large to add up")]
    Overflow(String),
}
