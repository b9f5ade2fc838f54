// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Transaction writes: create, update and delete, each followed by a card
//! balance recomputation for every card the change touched. The write and the
//! recomputation commit together.

use crate::cards;
use crate::error::StoreError;
use crate::models::{Transaction, TxType};
use crate::reconcile::{self, FieldOutcome, Link, TransactionPatch};
use crate::store::{Collection, EntityStore, Record};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq)]
pub struct WriteOutcome {
    pub transaction: Transaction,
    pub links: BTreeMap<Link, FieldOutcome>,
    /// Card id -> recomputed used amount.
    pub cards: BTreeMap<String, Decimal>,
}

impl WriteOutcome {
    pub fn stale_links(&self) -> Vec<Link> {
        self.links
            .iter()
            .filter(|(_, o)| **o == FieldOutcome::FetchFailed)
            .map(|(l, _)| *l)
            .collect()
    }
}

pub fn load<S: EntityStore + ?Sized>(store: &S, id: &str) -> Result<Transaction, StoreError> {
    match store.get(Collection::Transactions, id)? {
        Record::Transaction(t) => Ok(t),
        _ => Err(StoreError::Corrupt {
            field: "transactions",
            value: id.to_string(),
        }),
    }
}

/// Insert a new transaction, filling its cached names from the linked rows.
///
/// Any names the caller already set are kept when a lookup fails.
pub fn create_transaction<S: EntityStore + ?Sized>(
    store: &S,
    mut tx: Transaction,
) -> Result<WriteOutcome, StoreError> {
    if tx.r#type != TxType::Transfer && tx.to_account_id.as_deref().is_some_and(|a| !a.is_empty()) {
        return Err(destination_rejected());
    }
    let mut links = BTreeMap::new();
    for link in Link::ALL {
        let id = link.current_id(&tx).map(str::to_string);
        let outcome = match id.as_deref() {
            None => FieldOutcome::Unchanged,
            Some("") => {
                clear_link(&mut tx, link);
                FieldOutcome::Cleared
            }
            Some(id) => match reconcile::fetch_display(store, link, id) {
                Some((name, icon)) => {
                    set_display(&mut tx, link, name, icon);
                    FieldOutcome::Updated
                }
                None => FieldOutcome::FetchFailed,
            },
        };
        links.insert(link, outcome);
    }

    let touched: BTreeSet<String> = tx.credit_card_id.iter().cloned().collect();
    let cards = store.atomically(|| {
        store.insert_transaction(&tx)?;
        sync_cards(store, &touched)
    })?;
    log::debug!("created transaction '{}'", tx.id);
    Ok(WriteOutcome {
        transaction: tx,
        links,
        cards,
    })
}

/// Apply a partial update. Name lookups fail soft; store writes do not.
pub fn update_transaction<S: EntityStore + ?Sized>(
    store: &S,
    id: &str,
    patch: &TransactionPatch,
) -> Result<WriteOutcome, StoreError> {
    let old = load(store, id)?;
    if !reconcile::destination_allowed(&old, patch) {
        return Err(destination_rejected());
    }
    let rec = reconcile::reconcile(store, &old, patch);

    let (after, cards) = store.atomically(|| {
        store.update(Collection::Transactions, id, &rec.fields)?;
        let after = load(store, id)?;
        let mut touched = BTreeSet::new();
        if !rec.fields.is_empty() {
            touched.extend(old.credit_card_id.iter().cloned());
            touched.extend(after.credit_card_id.iter().cloned());
        }
        let cards = sync_cards(store, &touched)?;
        Ok((after, cards))
    })?;

    let outcome = WriteOutcome {
        transaction: after,
        links: rec.outcomes,
        cards,
    };
    let stale = outcome.stale_links();
    if !stale.is_empty() {
        log::warn!("transaction '{}' saved with stale names for {:?}", id, stale);
    }
    Ok(outcome)
}

/// Delete and recompute the card it was charged to, if any.
pub fn delete_transaction<S: EntityStore + ?Sized>(
    store: &S,
    id: &str,
) -> Result<BTreeMap<String, Decimal>, StoreError> {
    let old = load(store, id)?;
    let touched: BTreeSet<String> = old.credit_card_id.into_iter().collect();
    let cards = store.atomically(|| {
        store.delete(Collection::Transactions, id)?;
        sync_cards(store, &touched)
    })?;
    log::debug!("deleted transaction '{}'", id);
    Ok(cards)
}

fn destination_rejected() -> StoreError {
    StoreError::Rejected("a destination account only applies to transfers".to_string())
}

fn sync_cards<S: EntityStore + ?Sized>(
    store: &S,
    card_ids: &BTreeSet<String>,
) -> Result<BTreeMap<String, Decimal>, StoreError> {
    let mut out = BTreeMap::new();
    for card_id in card_ids.iter().filter(|c| !c.is_empty()) {
        if let Some(used) = cards::sync_used(store, card_id)? {
            out.insert(card_id.clone(), used);
        }
    }
    Ok(out)
}

fn clear_link(tx: &mut Transaction, link: Link) {
    match link {
        Link::Account => {
            tx.account_id = None;
            tx.account_name = None;
        }
        Link::Category => {
            tx.category_id = None;
            tx.category_name = None;
            tx.category_icon = None;
        }
        Link::ToAccount => {
            tx.to_account_id = None;
            tx.to_account_name = None;
        }
        Link::CreditCard => {
            tx.credit_card_id = None;
            tx.credit_card_name = None;
        }
    }
}

fn set_display(tx: &mut Transaction, link: Link, name: String, icon: Option<String>) {
    match link {
        Link::Account => tx.account_name = Some(name),
        Link::Category => {
            tx.category_name = Some(name);
            tx.category_icon = icon;
        }
        Link::ToAccount => tx.to_account_name = Some(name),
        Link::CreditCard => tx.credit_card_name = Some(name),
    }
}
