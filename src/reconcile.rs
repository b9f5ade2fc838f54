// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Keeping the denormalized names on a transaction in step with its links.
//!
//! A transaction caches the display name of the account, category,
//! destination account and credit card it points at. When an edit changes one
//! of those ids the cached name has to be fetched again or cleared. [`plan`]
//! works out what to do without touching the store; [`reconcile`] carries the
//! plan out and never fails as a whole: a lookup that errors leaves the old
//! name in place and is reported as [`FieldOutcome::FetchFailed`].

use crate::models::{Transaction, TxStatus, TxType};
use crate::store::{Collection, EntityStore, FieldMap, FieldValue, Record};
use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Tri-state payload value: not mentioned, explicitly null, or set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    #[default]
    Absent,
    Null,
    Set(T),
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }
}

/// Partial update payload for a transaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPatch {
    pub r#type: Option<TxType>,
    pub amount: Option<Decimal>,
    pub status: Option<TxStatus>,
    pub date: Option<NaiveDate>,
    pub description: Patch<String>,
    pub account_id: Patch<String>,
    pub category_id: Patch<String>,
    pub to_account_id: Patch<String>,
    pub credit_card_id: Patch<String>,
}

// Cached on the record; never taken from a payload.
const DERIVED_KEYS: &[&str] = &[
    "id",
    "accountName",
    "categoryName",
    "categoryIcon",
    "toAccountName",
    "creditCardName",
    "createdAt",
];

impl TransactionPatch {
    /// Parse a camelCase JSON object such as `{"accountId": "acc2", "amount": 200}`.
    ///
    /// Linked ids of the wrong JSON type are kept in their textual form so the
    /// lookup is still attempted (and fails soft).
    pub fn from_json(v: &Value) -> Result<Self> {
        let obj = v
            .as_object()
            .ok_or_else(|| anyhow!("Update payload must be a JSON object"))?;
        let mut p = TransactionPatch::default();
        for (key, val) in obj {
            match key.as_str() {
                "type" => p.r#type = Some(required_str(key, val)?.parse()?),
                "status" => p.status = Some(required_str(key, val)?.parse()?),
                "amount" => p.amount = Some(parse_amount(val)?),
                "date" => {
                    let s = required_str(key, val)?;
                    p.date = Some(
                        NaiveDate::parse_from_str(s, "%Y-%m-%d")
                            .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))?,
                    );
                }
                "description" => p.description = string_patch(val),
                "accountId" => p.account_id = string_patch(val),
                "categoryId" => p.category_id = string_patch(val),
                "toAccountId" => p.to_account_id = string_patch(val),
                "creditCardId" => p.credit_card_id = string_patch(val),
                k if DERIVED_KEYS.contains(&k) => {
                    log::debug!("ignoring derived field '{}' in update payload", k);
                }
                other => return Err(anyhow!("Unknown transaction field '{}'", other)),
            }
        }
        Ok(p)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let v: Value = serde_json::from_str(s).context("Update payload is not valid JSON")?;
        Self::from_json(&v)
    }

    pub fn is_empty(&self) -> bool {
        *self == TransactionPatch::default()
    }

    fn link(&self, link: Link) -> &Patch<String> {
        match link {
            Link::Account => &self.account_id,
            Link::Category => &self.category_id,
            Link::ToAccount => &self.to_account_id,
            Link::CreditCard => &self.credit_card_id,
        }
    }
}

fn required_str<'v>(key: &str, val: &'v Value) -> Result<&'v str> {
    val.as_str()
        .ok_or_else(|| anyhow!("Field '{}' must be a string", key))
}

fn parse_amount(val: &Value) -> Result<Decimal> {
    let raw = match val {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return Err(anyhow!("Field 'amount' must be a number")),
    };
    let d = raw
        .parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&raw))
        .with_context(|| format!("Invalid amount '{}'", raw))?;
    if d < Decimal::ZERO {
        return Err(anyhow!("Amount must not be negative ({})", d));
    }
    Ok(d)
}

fn string_patch(val: &Value) -> Patch<String> {
    match val {
        Value::Null => Patch::Null,
        Value::String(s) => Patch::Set(s.clone()),
        other => Patch::Set(other.to_string()),
    }
}

/// A linked-id field and the cached fields that follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Link {
    Account,
    Category,
    ToAccount,
    CreditCard,
}

impl Link {
    pub const ALL: [Link; 4] = [Link::Account, Link::Category, Link::ToAccount, Link::CreditCard];

    pub fn id_column(&self) -> &'static str {
        match self {
            Link::Account => "account_id",
            Link::Category => "category_id",
            Link::ToAccount => "to_account_id",
            Link::CreditCard => "credit_card_id",
        }
    }

    pub fn name_column(&self) -> &'static str {
        match self {
            Link::Account => "account_name",
            Link::Category => "category_name",
            Link::ToAccount => "to_account_name",
            Link::CreditCard => "credit_card_name",
        }
    }

    /// Only the category carries an icon alongside its name.
    pub fn icon_column(&self) -> Option<&'static str> {
        match self {
            Link::Category => Some("category_icon"),
            _ => None,
        }
    }

    pub fn collection(&self) -> Collection {
        match self {
            Link::Account | Link::ToAccount => Collection::Accounts,
            Link::Category => Collection::Categories,
            Link::CreditCard => Collection::CreditCards,
        }
    }

    pub fn current_id<'t>(&self, tx: &'t Transaction) -> Option<&'t str> {
        match self {
            Link::Account => tx.account_id.as_deref(),
            Link::Category => tx.category_id.as_deref(),
            Link::ToAccount => tx.to_account_id.as_deref(),
            Link::CreditCard => tx.credit_card_id.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkDecision {
    Untouched,
    Fetch(String),
    Clear,
}

/// Decide what happens to one link's cached fields.
pub fn decide(current: Option<&str>, patch: &Patch<String>) -> LinkDecision {
    match patch {
        Patch::Absent => LinkDecision::Untouched,
        Patch::Null => LinkDecision::Clear,
        Patch::Set(id) if id.is_empty() => LinkDecision::Clear,
        Patch::Set(id) if current == Some(id.as_str()) => LinkDecision::Untouched,
        Patch::Set(id) => LinkDecision::Fetch(id.clone()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchIntent {
    pub link: Link,
    pub id: String,
}

/// Everything an update will write, minus the names still to be fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcilePlan {
    pub fields: FieldMap,
    pub decisions: BTreeMap<Link, LinkDecision>,
}

impl ReconcilePlan {
    pub fn intents(&self) -> Vec<FetchIntent> {
        self.decisions
            .iter()
            .filter_map(|(link, d)| match d {
                LinkDecision::Fetch(id) => Some(FetchIntent {
                    link: *link,
                    id: id.clone(),
                }),
                _ => None,
            })
            .collect()
    }
}

/// The type `old` will have once `patch` is applied.
pub fn effective_type(old: &Transaction, patch: &TransactionPatch) -> TxType {
    patch.r#type.unwrap_or(old.r#type)
}

/// False when the patch points a non-transfer at a destination account.
pub fn destination_allowed(old: &Transaction, patch: &TransactionPatch) -> bool {
    effective_type(old, patch) == TxType::Transfer
        || !matches!(&patch.to_account_id, Patch::Set(id) if !id.is_empty())
}

pub fn plan(old: &Transaction, patch: &TransactionPatch) -> ReconcilePlan {
    let mut fields = FieldMap::new();

    if let Some(t) = patch.r#type {
        fields.insert("type", FieldValue::Text(t.as_str().to_string()));
    }
    if let Some(a) = patch.amount {
        fields.insert("amount", FieldValue::Decimal(a));
    }
    if let Some(s) = patch.status {
        fields.insert("status", FieldValue::Text(s.as_str().to_string()));
    }
    if let Some(d) = patch.date {
        fields.insert("date", FieldValue::Date(d));
    }
    match &patch.description {
        Patch::Absent => {}
        Patch::Null => {
            fields.insert("description", FieldValue::Null);
        }
        Patch::Set(s) => {
            fields.insert("description", FieldValue::Text(s.clone()));
        }
    }

    let drop_destination = effective_type(old, patch) != TxType::Transfer
        && (old.to_account_id.is_some() || old.to_account_name.is_some());

    let mut decisions = BTreeMap::new();
    for link in Link::ALL {
        let mut decision = decide(link.current_id(old), patch.link(link));
        // destinations only exist on transfers
        if link == Link::ToAccount && drop_destination && decision == LinkDecision::Untouched {
            decision = LinkDecision::Clear;
        }
        match &decision {
            LinkDecision::Untouched => {}
            LinkDecision::Clear => {
                fields.insert(link.id_column(), FieldValue::Null);
                fields.insert(link.name_column(), FieldValue::Null);
                if let Some(icon) = link.icon_column() {
                    fields.insert(icon, FieldValue::Null);
                }
            }
            LinkDecision::Fetch(id) => {
                fields.insert(link.id_column(), FieldValue::Text(id.clone()));
            }
        }
        decisions.insert(link, decision);
    }

    ReconcilePlan { fields, decisions }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldOutcome {
    Unchanged,
    Updated,
    Cleared,
    FetchFailed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub fields: FieldMap,
    pub outcomes: BTreeMap<Link, FieldOutcome>,
}

impl Reconciliation {
    pub fn outcome(&self, link: Link) -> FieldOutcome {
        self.outcomes
            .get(&link)
            .copied()
            .unwrap_or(FieldOutcome::Unchanged)
    }
}

/// Look up the display fields for a linked entity.
pub fn fetch_display<S: EntityStore + ?Sized>(
    store: &S,
    link: Link,
    id: &str,
) -> Option<(String, Option<String>)> {
    match store.get(link.collection(), id) {
        Ok(record) => Some(display_of(&record)),
        Err(e) => {
            log::warn!(
                "could not refresh {} for {} '{}': {}; keeping cached name",
                link.name_column(),
                link.collection().label(),
                id,
                e
            );
            None
        }
    }
}

fn display_of(record: &Record) -> (String, Option<String>) {
    (record.name().to_string(), record.icon().map(str::to_string))
}

/// Run [`plan`] and perform its lookups. Never fails; see module docs.
pub fn reconcile<S: EntityStore + ?Sized>(
    store: &S,
    old: &Transaction,
    patch: &TransactionPatch,
) -> Reconciliation {
    let ReconcilePlan {
        mut fields,
        decisions,
    } = plan(old, patch);
    let mut outcomes = BTreeMap::new();

    for (link, decision) in decisions {
        let outcome = match decision {
            LinkDecision::Untouched => FieldOutcome::Unchanged,
            LinkDecision::Clear => FieldOutcome::Cleared,
            LinkDecision::Fetch(id) => match fetch_display(store, link, &id) {
                Some((name, icon)) => {
                    fields.insert(link.name_column(), FieldValue::Text(name));
                    if let Some(col) = link.icon_column() {
                        fields.insert(col, FieldValue::text_or_null(icon.as_deref()));
                    }
                    FieldOutcome::Updated
                }
                None => FieldOutcome::FetchFailed,
            },
        };
        log::debug!("{:?}: {:?}", link, outcome);
        outcomes.insert(link, outcome);
    }

    Reconciliation { fields, outcomes }
}

/// Apply a field map to an in-memory copy, mirroring what the store write does.
pub fn apply_fields(tx: &mut Transaction, fields: &FieldMap) {
    fn text(v: &FieldValue) -> Option<String> {
        match v {
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::Int(i) => Some(i.to_string()),
            FieldValue::Decimal(d) => Some(d.to_string()),
            FieldValue::Date(d) => Some(d.to_string()),
            FieldValue::Null => None,
        }
    }
    for (col, val) in fields {
        match *col {
            "type" => {
                if let Some(t) = text(val).and_then(|s| s.parse().ok()) {
                    tx.r#type = t;
                }
            }
            "status" => {
                if let Some(s) = text(val).and_then(|s| s.parse().ok()) {
                    tx.status = s;
                }
            }
            "amount" => {
                if let FieldValue::Decimal(d) = val {
                    tx.amount = *d;
                }
            }
            "date" => {
                if let FieldValue::Date(d) = val {
                    tx.date = *d;
                }
            }
            "description" => tx.description = text(val),
            "account_id" => tx.account_id = text(val),
            "account_name" => tx.account_name = text(val),
            "category_id" => tx.category_id = text(val),
            "category_name" => tx.category_name = text(val),
            "category_icon" => tx.category_icon = text(val),
            "to_account_id" => tx.to_account_id = text(val),
            "to_account_name" => tx.to_account_name = text(val),
            "credit_card_id" => tx.credit_card_id = text(val),
            "credit_card_name" => tx.credit_card_name = text(val),
            _ => {}
        }
    }
}
