// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Monthly report aggregation over already-fetched transactions.

use crate::error::ReportError;
use crate::models::{Transaction, TxType};
use crate::utils::Period;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Debt share of salary (in percent) at which the report raises an alert.
pub const DEBT_ALERT_PERCENT: i64 = 30;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub income: Decimal,
    pub expense: Decimal,
    pub debit_expenses: Decimal,
    pub credit_expenses: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviousMonth {
    pub period: Period,
    pub balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReport {
    pub period: Period,
    pub income: Decimal,
    pub expense: Decimal,
    pub debit_expenses: Decimal,
    pub credit_expenses: Decimal,
    pub balance: Decimal,
    pub total_credit_card_usage: Decimal,
    pub salary: Option<Decimal>,
    pub debt_percentage: Decimal,
    pub previous_month: PreviousMonth,
    pub change: MonthDelta,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthDelta {
    pub delta: Decimal,
    pub improved: bool,
}

pub struct ReportInput<'a> {
    pub period: Period,
    pub current: &'a [Transaction],
    pub previous: &'a [Transaction],
    pub salary: Option<Decimal>,
    pub total_credit_card_usage: Decimal,
}

fn add(acc: &mut Decimal, amount: Decimal, what: &'static str) -> Result<(), ReportError> {
    *acc = acc
        .checked_add(amount)
        .ok_or(ReportError::Overflow(what))?;
    Ok(())
}

/// `part / whole * 100`, failing instead of overflowing.
fn percent_of(part: Decimal, whole: Decimal, what: &'static str) -> Result<Decimal, ReportError> {
    part.checked_div(whole)
        .and_then(|q| q.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or(ReportError::Overflow(what))
}

/// Sum a period's transactions. Cancelled entries and transfers are skipped.
pub fn totals(txs: &[Transaction]) -> Result<Totals, ReportError> {
    let mut t = Totals::default();
    for tx in txs {
        if tx.amount < Decimal::ZERO {
            return Err(ReportError::NegativeAmount {
                id: tx.id.clone(),
                amount: tx.amount,
            });
        }
        if tx.is_cancelled() {
            continue;
        }
        match tx.r#type {
            TxType::Income => add(&mut t.income, tx.amount, "income")?,
            TxType::Expense => {
                add(&mut t.expense, tx.amount, "expense")?;
                if tx.is_card_expense() {
                    add(&mut t.credit_expenses, tx.amount, "credit expenses")?;
                } else {
                    add(&mut t.debit_expenses, tx.amount, "debit expenses")?;
                }
            }
            TxType::Transfer => {}
        }
    }
    t.balance = t
        .income
        .checked_sub(t.expense)
        .ok_or(ReportError::Overflow("balance"))?;
    Ok(t)
}

pub fn build(input: ReportInput<'_>) -> Result<MonthlyReport, ReportError> {
    if let Some(s) = input.salary {
        if s < Decimal::ZERO {
            return Err(ReportError::NegativeSalary(s));
        }
    }
    if input.total_credit_card_usage < Decimal::ZERO {
        return Err(ReportError::NegativeUsage(input.total_credit_card_usage));
    }

    let current = totals(input.current)?;
    let previous = totals(input.previous)?;

    let debt_percentage = match input.salary {
        Some(s) if s > Decimal::ZERO => {
            percent_of(input.total_credit_card_usage, s, "debt percentage")?
        }
        _ => Decimal::ZERO,
    };
    let delta = current
        .balance
        .checked_sub(previous.balance)
        .ok_or(ReportError::Overflow("month-over-month change"))?;

    Ok(MonthlyReport {
        period: input.period,
        income: current.income,
        expense: current.expense,
        debit_expenses: current.debit_expenses,
        credit_expenses: current.credit_expenses,
        balance: current.balance,
        total_credit_card_usage: input.total_credit_card_usage,
        salary: input.salary,
        debt_percentage,
        previous_month: PreviousMonth {
            period: input.period.previous(),
            balance: previous.balance,
        },
        change: MonthDelta {
            delta,
            improved: delta > Decimal::ZERO,
        },
    })
}

impl MonthlyReport {
    /// The percentage to show, or `None` when there is no salary to compare with.
    pub fn debt_percentage_display(&self) -> Option<Decimal> {
        match self.salary {
            Some(s) if s > Decimal::ZERO => Some(self.debt_percentage),
            _ => None,
        }
    }

    pub fn debt_alert(&self) -> bool {
        self.debt_percentage_display()
            .is_some_and(|p| p >= Decimal::from(DEBT_ALERT_PERCENT))
    }

    pub fn delta(&self) -> MonthDelta {
        self.change
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySpend {
    pub category_id: Option<String>,
    pub category_name: String,
    pub icon: Option<String>,
    pub total: Decimal,
}

/// Non-cancelled expenses grouped by category, largest first.
pub fn top_categories(txs: &[Transaction]) -> Result<Vec<CategorySpend>, ReportError> {
    let mut agg: HashMap<Option<String>, CategorySpend> = HashMap::new();
    for tx in txs
        .iter()
        .filter(|t| t.r#type == TxType::Expense && !t.is_cancelled())
    {
        let entry = agg
            .entry(tx.category_id.clone())
            .or_insert_with(|| CategorySpend {
                category_id: tx.category_id.clone(),
                category_name: tx
                    .category_name
                    .clone()
                    .unwrap_or_else(|| "(uncategorized)".to_string()),
                icon: tx.category_icon.clone(),
                total: Decimal::ZERO,
            });
        add(&mut entry.total, tx.amount, "category totals")?;
    }
    let mut items: Vec<_> = agg.into_values().collect();
    items.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.category_name.cmp(&b.category_name))
    });
    Ok(items)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum CategoryInsight {
    MoreThanHalf { category: String },
    Share { category: String, percent: Decimal },
    Spread,
}

impl fmt::Display for CategoryInsight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryInsight::MoreThanHalf { category } => {
                write!(f, "More than half of spending went to {}", category)
            }
            CategoryInsight::Share { category, percent } => {
                write!(f, "{}% of spending went to {}", percent.round(), category)
            }
            CategoryInsight::Spread => f.write_str("Spending is spread across several categories"),
        }
    }
}

/// Describe how dominant the top category is. `None` when nothing was spent.
pub fn category_insight(ranking: &[CategorySpend], total_expense: Decimal) -> Option<CategoryInsight> {
    let top = ranking.first()?;
    if total_expense <= Decimal::ZERO {
        return None;
    }
    // a share too large to represent is more than half anyway
    let pct = percent_of(top.total, total_expense, "category share").unwrap_or(Decimal::MAX);
    let insight = if pct >= Decimal::from(50) {
        CategoryInsight::MoreThanHalf {
            category: top.category_name.clone(),
        }
    } else if pct >= Decimal::from(30) {
        CategoryInsight::Share {
            category: top.category_name.clone(),
            percent: pct,
        }
    } else {
        CategoryInsight::Spread
    };
    Some(insight)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TxStatus;
    use chrono::NaiveDate;

    fn tx(id: &str, kind: TxType, amount: i64) -> Transaction {
        Transaction::new(id, kind, Decimal::from(amount), NaiveDate::from_ymd_opt(2025, 6, 15).unwrap())
    }

    fn on_card(mut t: Transaction) -> Transaction {
        t.credit_card_id = Some("card1".into());
        t
    }

    fn in_category(mut t: Transaction, id: &str, name: &str) -> Transaction {
        t.category_id = Some(id.into());
        t.category_name = Some(name.into());
        t
    }

    fn june() -> Period {
        Period::new(2025, 6).unwrap()
    }

    #[test]
    fn reference_scenario() {
        let current = vec![
            tx("i1", TxType::Income, 5000),
            tx("e1", TxType::Expense, 2000),
            on_card(tx("e2", TxType::Expense, 1500)),
        ];
        let r = build(ReportInput {
            period: june(),
            current: &current,
            previous: &[],
            salary: Some(Decimal::from(5000)),
            total_credit_card_usage: Decimal::from(1600),
        })
        .unwrap();
        assert_eq!(r.income, Decimal::from(5000));
        assert_eq!(r.expense, Decimal::from(3500));
        assert_eq!(r.debit_expenses, Decimal::from(2000));
        assert_eq!(r.credit_expenses, Decimal::from(1500));
        assert_eq!(r.balance, Decimal::from(1500));
        assert_eq!(r.debt_percentage, Decimal::from(32));
        assert_eq!(r.debt_percentage_display(), Some(Decimal::from(32)));
        assert!(r.debt_alert());
        assert_eq!(r.previous_month.period, Period::new(2025, 5).unwrap());
    }

    #[test]
    fn cancelled_and_transfers_do_not_count() {
        let mut cancelled = tx("e3", TxType::Expense, 999);
        cancelled.status = TxStatus::Cancelled;
        let mut pending = tx("e4", TxType::Expense, 10);
        pending.status = TxStatus::Pending;
        let t = totals(&[
            tx("i1", TxType::Income, 100),
            tx("t1", TxType::Transfer, 50),
            cancelled,
            pending,
        ])
        .unwrap();
        assert_eq!(t.income, Decimal::from(100));
        assert_eq!(t.expense, Decimal::from(10));
        assert_eq!(t.balance, Decimal::from(90));
    }

    #[test]
    fn balance_is_income_minus_expense() {
        let sets: Vec<Vec<Transaction>> = vec![
            vec![],
            vec![tx("a", TxType::Expense, 70)],
            vec![tx("a", TxType::Income, 3), on_card(tx("b", TxType::Expense, 8)), tx("c", TxType::Expense, 1)],
            vec![tx("a", TxType::Income, 1200), tx("b", TxType::Income, 35), tx("c", TxType::Transfer, 400)],
        ];
        for set in sets {
            let t = totals(&set).unwrap();
            assert_eq!(t.income - t.expense, t.balance);
            assert_eq!(t.debit_expenses + t.credit_expenses, t.expense);
        }
    }

    #[test]
    fn no_salary_means_zero_and_hidden() {
        for salary in [None, Some(Decimal::ZERO)] {
            let r = build(ReportInput {
                period: june(),
                current: &[],
                previous: &[],
                salary,
                total_credit_card_usage: Decimal::from(1600),
            })
            .unwrap();
            assert_eq!(r.debt_percentage, Decimal::ZERO);
            assert_eq!(r.debt_percentage_display(), None);
            assert!(!r.debt_alert());
        }
    }

    #[test]
    fn month_over_month_delta() {
        let r = build(ReportInput {
            period: june(),
            current: &[tx("i", TxType::Income, 1000), tx("e", TxType::Expense, 400)],
            previous: &[tx("i", TxType::Income, 1000), tx("e", TxType::Expense, 700)],
            salary: None,
            total_credit_card_usage: Decimal::ZERO,
        })
        .unwrap();
        assert_eq!(r.previous_month.balance, Decimal::from(300));
        let d = r.delta();
        assert_eq!(d.delta, Decimal::from(300));
        assert!(d.improved);

        let flat = build(ReportInput {
            period: june(),
            current: &[],
            previous: &[],
            salary: None,
            total_credit_card_usage: Decimal::ZERO,
        })
        .unwrap();
        assert!(!flat.delta().improved);
    }

    #[test]
    fn invalid_input_is_an_error_not_a_report() {
        let bad = tx("x", TxType::Expense, -5);
        let err = build(ReportInput {
            period: june(),
            current: &[],
            previous: std::slice::from_ref(&bad),
            salary: None,
            total_credit_card_usage: Decimal::ZERO,
        })
        .unwrap_err();
        assert_eq!(
            err,
            ReportError::NegativeAmount {
                id: "x".into(),
                amount: Decimal::from(-5)
            }
        );

        assert!(matches!(
            build(ReportInput {
                period: june(),
                current: &[],
                previous: &[],
                salary: Some(Decimal::from(-1)),
                total_credit_card_usage: Decimal::ZERO,
            }),
            Err(ReportError::NegativeSalary(_))
        ));
        assert!(matches!(
            build(ReportInput {
                period: june(),
                current: &[],
                previous: &[],
                salary: Some(Decimal::from(100)),
                total_credit_card_usage: Decimal::from(-1),
            }),
            Err(ReportError::NegativeUsage(_))
        ));
    }

    #[test]
    fn top_category_ranking_and_insight() {
        let txs = vec![
            in_category(tx("a", TxType::Expense, 300), "food", "Food"),
            in_category(tx("b", TxType::Expense, 300), "food", "Food"),
            in_category(tx("c", TxType::Expense, 250), "home", "Home"),
            tx("d", TxType::Expense, 150),
            in_category(tx("e", TxType::Income, 5000), "salary", "Salary"),
        ];
        let ranking = top_categories(&txs).unwrap();
        assert_eq!(ranking.len(), 3);
        assert_eq!(ranking[0].category_name, "Food");
        assert_eq!(ranking[0].total, Decimal::from(600));
        assert_eq!(ranking[2].category_name, "(uncategorized)");

        let insight = category_insight(&ranking, Decimal::from(1000)).unwrap();
        assert_eq!(insight, CategoryInsight::MoreThanHalf { category: "Food".into() });

        let insight = category_insight(&ranking, Decimal::from(1500)).unwrap();
        assert_eq!(insight.to_string(), "40% of spending went to Food");

        assert_eq!(
            category_insight(&ranking, Decimal::from(3000)),
            Some(CategoryInsight::Spread)
        );
        assert_eq!(category_insight(&[], Decimal::ZERO), None);
    }

    fn big(id: &str, kind: TxType) -> Transaction {
        Transaction::new(id, kind, Decimal::MAX, NaiveDate::from_ymd_opt(2025, 6, 15).unwrap())
    }

    #[test]
    fn oversized_sums_are_an_error() {
        let err = totals(&[big("a", TxType::Income), big("b", TxType::Income)]).unwrap_err();
        assert_eq!(err, ReportError::Overflow("income"));

        let err = totals(&[big("a", TxType::Expense), on_card(big("b", TxType::Expense))]).unwrap_err();
        assert_eq!(err, ReportError::Overflow("expense"));

        let err = top_categories(&[big("a", TxType::Expense), big("b", TxType::Expense)]).unwrap_err();
        assert_eq!(err, ReportError::Overflow("category totals"));
    }

    #[test]
    fn tiny_salary_is_an_error_not_a_panic() {
        let err = build(ReportInput {
            period: june(),
            current: &[],
            previous: &[],
            salary: Some(Decimal::new(1, 28)),
            total_credit_card_usage: Decimal::from(1_000_000),
        })
        .unwrap_err();
        assert_eq!(err, ReportError::Overflow("debt percentage"));
    }

    #[test]
    fn change_between_extreme_months_is_an_error() {
        let err = build(ReportInput {
            period: june(),
            current: &[big("i", TxType::Income)],
            previous: &[big("e", TxType::Expense)],
            salary: None,
            total_credit_card_usage: Decimal::ZERO,
        })
        .unwrap_err();
        assert_eq!(err, ReportError::Overflow("month-over-month change"));
    }

    #[test]
    fn insight_survives_a_tiny_total() {
        let ranking = vec![CategorySpend {
            category_id: Some("food".into()),
            category_name: "Food".into(),
            icon: None,
            total: Decimal::from(1_000_000),
        }];
        assert_eq!(
            category_insight(&ranking, Decimal::new(1, 28)),
            Some(CategoryInsight::MoreThanHalf { category: "Food".into() })
        );
    }
}
