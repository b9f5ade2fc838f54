// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{CardError, StoreError};
use crate::models::{CreditCard, Transaction, TxType};
use crate::store::{Collection, EntityStore, FieldMap, FieldValue};
use crate::utils::Period;
use rust_decimal::Decimal;
use serde::Serialize;

/// Outstanding amount on a card, derived from its transactions.
///
/// Expenses add to the balance, anything else (refunds, bill payments)
/// takes away from it. Cancelled entries are ignored.
pub fn used_from_transactions(card_id: &str, txs: &[Transaction]) -> Result<Decimal, CardError> {
    net_charges(card_id, txs.iter())
}

fn net_charges<'t>(
    card_id: &str,
    txs: impl Iterator<Item = &'t Transaction>,
) -> Result<Decimal, CardError> {
    txs.filter(|t| t.credit_card_id.as_deref() == Some(card_id) && !t.is_cancelled())
        .try_fold(Decimal::ZERO, |acc, t| {
            let next = if t.r#type == TxType::Expense {
                acc.checked_add(t.amount)
            } else {
                acc.checked_sub(t.amount)
            };
            next.ok_or_else(|| CardError::Overflow(card_id.to_string()))
        })
}

/// Recompute and store `current_used` for a card.
///
/// Returns `None` when the card no longer exists.
pub fn sync_used<S: EntityStore + ?Sized>(
    store: &S,
    card_id: &str,
) -> Result<Option<Decimal>, StoreError> {
    let txs = store.transactions_for_card(card_id)?;
    let used = used_from_transactions(card_id, &txs)?;
    let mut fields = FieldMap::new();
    fields.insert("current_used", FieldValue::Decimal(used));
    match store.update(Collection::CreditCards, card_id, &fields) {
        Ok(()) => {
            log::debug!("card '{}' used recomputed to {}", card_id, used);
            Ok(Some(used))
        }
        Err(e) if e.is_not_found() => {
            log::debug!("card '{}' is gone; nothing to recompute", card_id);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

pub fn validate(limit: Decimal, due_day: u32) -> Result<(), CardError> {
    if limit < Decimal::ZERO {
        return Err(CardError::NegativeLimit(limit));
    }
    if !(1..=31).contains(&due_day) {
        return Err(CardError::InvalidDueDay(due_day));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Normal,
    Warning,
    Danger,
}

impl AlertLevel {
    pub fn for_percent(pct: Decimal) -> Self {
        if pct > Decimal::from(80) {
            AlertLevel::Danger
        } else if pct > Decimal::from(50) {
            AlertLevel::Warning
        } else {
            AlertLevel::Normal
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BillStatus {
    Paid,
    Pending,
    Overdue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardUsage {
    pub used: Decimal,
    pub available: Decimal,
    pub usage_percent: Decimal,
    /// `usage_percent` capped at 100 for progress bars.
    pub display_percent: Decimal,
    pub alert: AlertLevel,
}

pub fn usage(card: &CreditCard) -> Result<CardUsage, CardError> {
    let used = card.current_used;
    let overflow = || CardError::Overflow(card.id.clone());
    let usage_percent = if card.limit > Decimal::ZERO {
        used.checked_div(card.limit)
            .and_then(|q| q.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or_else(overflow)?
    } else {
        Decimal::ZERO
    };
    Ok(CardUsage {
        used,
        available: card.limit.checked_sub(used).ok_or_else(overflow)?,
        usage_percent,
        display_percent: usage_percent.min(Decimal::ONE_HUNDRED),
        alert: AlertLevel::for_percent(usage_percent),
    })
}

pub fn bill_status(card: &CreditCard, day_of_month: u32) -> BillStatus {
    if card.current_used.is_zero() {
        BillStatus::Paid
    } else if day_of_month <= card.due_day {
        BillStatus::Pending
    } else {
        BillStatus::Overdue
    }
}

/// Point-in-time outstanding total across cards; overpaid cards count as zero.
pub fn total_usage(cards: &[CreditCard]) -> Result<Decimal, CardError> {
    cards.iter().try_fold(Decimal::ZERO, |acc, c| {
        acc.checked_add(c.current_used.max(Decimal::ZERO))
            .ok_or_else(|| CardError::Overflow(c.id.clone()))
    })
}

/// A card's statement for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardBill {
    pub card_id: String,
    pub period: Period,
    /// Charges minus refunds and payments dated in the month.
    pub total: Decimal,
    pub paid: bool,
}

/// Bill for `period`, built from the card's transactions dated in that month.
pub fn bill_for(card_id: &str, period: Period, txs: &[Transaction]) -> Result<CardBill, CardError> {
    let total = net_charges(card_id, txs.iter().filter(|t| period.contains(t.date)))?;
    Ok(CardBill {
        card_id: card_id.to_string(),
        period,
        total,
        paid: total <= Decimal::ZERO,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn card(limit: i64, used: i64) -> CreditCard {
        CreditCard {
            id: "card1".into(),
            name: "Visa Gold".into(),
            icon: None,
            color: None,
            limit: Decimal::from(limit),
            due_day: 10,
            current_used: Decimal::from(used),
        }
    }

    fn card_tx(id: &str, kind: TxType, amount: i64) -> Transaction {
        let mut t = Transaction::new(id, kind, Decimal::from(amount), NaiveDate::from_ymd_opt(2025, 4, 2).unwrap());
        t.credit_card_id = Some("card1".into());
        t
    }

    #[test]
    fn used_is_recomputed_from_transactions() {
        let mut txs = vec![
            card_tx("a", TxType::Expense, 500),
            card_tx("b", TxType::Expense, 300),
            card_tx("c", TxType::Expense, 150),
        ];
        assert_eq!(used_from_transactions("card1", &txs), Ok(Decimal::from(950)));

        txs[2].status = crate::models::TxStatus::Cancelled;
        txs.push(card_tx("d", TxType::Income, 100));
        assert_eq!(used_from_transactions("card1", &txs), Ok(Decimal::from(700)));

        assert_eq!(used_from_transactions("card1", &[]), Ok(Decimal::ZERO));
        assert_eq!(used_from_transactions("other", &txs), Ok(Decimal::ZERO));
    }

    #[test]
    fn available_and_percent() {
        let u = usage(&card(10000, 3500)).unwrap();
        assert_eq!(u.available, Decimal::from(6500));
        assert_eq!(u.usage_percent, Decimal::from(35));
        assert_eq!(u.alert, AlertLevel::Normal);

        let u = usage(&card(1000, 1200)).unwrap();
        assert_eq!(u.available, Decimal::from(-200));
        assert_eq!(u.usage_percent, Decimal::from(120));
        assert_eq!(u.display_percent, Decimal::from(100));
        assert_eq!(u.alert, AlertLevel::Danger);
    }

    #[test]
    fn zero_limit_never_divides() {
        let u = usage(&card(0, 100)).unwrap();
        assert_eq!(u.usage_percent, Decimal::ZERO);
        assert_eq!(u.alert, AlertLevel::Normal);
    }

    #[test]
    fn alert_thresholds() {
        assert_eq!(AlertLevel::for_percent(Decimal::from(40)), AlertLevel::Normal);
        assert_eq!(AlertLevel::for_percent(Decimal::from(50)), AlertLevel::Normal);
        assert_eq!(AlertLevel::for_percent(Decimal::from(65)), AlertLevel::Warning);
        assert_eq!(AlertLevel::for_percent(Decimal::from(80)), AlertLevel::Warning);
        assert_eq!(AlertLevel::for_percent(Decimal::from(85)), AlertLevel::Danger);
    }

    #[test]
    fn bill_status_by_due_day() {
        assert_eq!(bill_status(&card(5000, 0), 25), BillStatus::Paid);
        assert_eq!(bill_status(&card(5000, 100), 10), BillStatus::Pending);
        assert_eq!(bill_status(&card(5000, 100), 11), BillStatus::Overdue);
    }

    #[test]
    fn validation() {
        assert_eq!(validate(Decimal::from(-1), 10), Err(CardError::NegativeLimit(Decimal::from(-1))));
        assert_eq!(validate(Decimal::from(100), 0), Err(CardError::InvalidDueDay(0)));
        assert_eq!(validate(Decimal::from(100), 31), Ok(()));
    }

    #[test]
    fn total_ignores_overpaid_cards() {
        let cards = vec![card(5000, 1000), card(2000, 600), card(1000, -50)];
        assert_eq!(total_usage(&cards), Ok(Decimal::from(1600)));
    }

    fn huge_card(used: Decimal) -> CreditCard {
        CreditCard {
            current_used: used,
            ..card(1, 0)
        }
    }

    #[test]
    fn oversized_amounts_are_an_error() {
        let txs = vec![
            card_tx_amount("a", TxType::Expense, Decimal::MAX),
            card_tx_amount("b", TxType::Expense, Decimal::MAX),
        ];
        assert_eq!(
            used_from_transactions("card1", &txs),
            Err(CardError::Overflow("card1".into()))
        );

        let tiny_limit = CreditCard {
            limit: Decimal::new(1, 28),
            ..huge_card(Decimal::from(1_000_000))
        };
        assert_eq!(usage(&tiny_limit), Err(CardError::Overflow("card1".into())));
        assert_eq!(
            usage(&huge_card(Decimal::MIN)),
            Err(CardError::Overflow("card1".into()))
        );
        assert_eq!(
            total_usage(&[huge_card(Decimal::MAX), huge_card(Decimal::MAX)]),
            Err(CardError::Overflow("card1".into()))
        );
    }

    fn card_tx_amount(id: &str, kind: TxType, amount: Decimal) -> Transaction {
        let mut t = card_tx(id, kind, 0);
        t.amount = amount;
        t
    }

    #[test]
    fn monthly_bill_only_counts_that_month() {
        let mut may = card_tx("m", TxType::Expense, 900);
        may.date = NaiveDate::from_ymd_opt(2025, 5, 28).unwrap();
        let mut cancelled = card_tx("x", TxType::Expense, 75);
        cancelled.status = crate::models::TxStatus::Cancelled;
        let txs = vec![
            may,
            card_tx("a", TxType::Expense, 500),
            card_tx("b", TxType::Expense, 120),
            card_tx("r", TxType::Income, 20),
            cancelled,
        ];
        let april = Period::new(2025, 4).unwrap();
        let bill = bill_for("card1", april, &txs).unwrap();
        assert_eq!(bill.total, Decimal::from(600));
        assert!(!bill.paid);
        assert_eq!(bill.period, april);

        let mut settled = txs.clone();
        settled.push(card_tx("p", TxType::Transfer, 600));
        assert!(bill_for("card1", april, &settled).unwrap().paid);

        let empty = bill_for("card1", Period::new(2025, 3).unwrap(), &txs).unwrap();
        assert_eq!(empty.total, Decimal::ZERO);
        assert!(empty.paid);
    }
}
