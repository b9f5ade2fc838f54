// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Entity store seam.
//!
//! The reconciliation and card logic only talk to [`EntityStore`]; the CLI
//! backs it with SQLite, tests back it with in-memory fakes.

use crate::error::StoreError;
use crate::models::{Account, Category, CreditCard, Goal, Transaction};
use chrono::NaiveDate;
use rusqlite::types::{Null, ToSqlOutput};
use rusqlite::{params, Connection, Row, ToSql};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Accounts,
    Categories,
    CreditCards,
    Transactions,
    Goals,
}

impl Collection {
    pub fn table(&self) -> &'static str {
        match self {
            Collection::Accounts => "accounts",
            Collection::Categories => "categories",
            Collection::CreditCards => "credit_cards",
            Collection::Transactions => "transactions",
            Collection::Goals => "goals",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Collection::Accounts => "account",
            Collection::Categories => "category",
            Collection::CreditCards => "credit card",
            Collection::Transactions => "transaction",
            Collection::Goals => "goal",
        }
    }

    /// Columns a partial update may touch.
    fn writable(&self) -> &'static [&'static str] {
        match self {
            Collection::Accounts => &["name"],
            Collection::Categories => &["name", "icon"],
            Collection::CreditCards => {
                &["name", "icon", "color", "credit_limit", "due_day", "current_used"]
            }
            Collection::Transactions => &[
                "type",
                "amount",
                "status",
                "date",
                "description",
                "account_id",
                "account_name",
                "category_id",
                "category_name",
                "category_icon",
                "to_account_id",
                "to_account_name",
                "credit_card_id",
                "credit_card_name",
            ],
            Collection::Goals => &["name", "target_amount", "current_amount", "timeframe", "icon"],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Account(Account),
    Category(Category),
    CreditCard(CreditCard),
    Transaction(Transaction),
    Goal(Goal),
}

impl Record {
    /// Display name a transaction would cache for this entity.
    pub fn name(&self) -> &str {
        match self {
            Record::Account(a) => &a.name,
            Record::Category(c) => &c.name,
            Record::CreditCard(c) => &c.name,
            Record::Transaction(t) => t.description.as_deref().unwrap_or(&t.id),
            Record::Goal(g) => &g.name,
        }
    }

    pub fn icon(&self) -> Option<&str> {
        match self {
            Record::Category(c) => c.icon.as_deref(),
            Record::CreditCard(c) => c.icon.as_deref(),
            Record::Goal(g) => g.icon.as_deref(),
            Record::Account(_) | Record::Transaction(_) => None,
        }
    }
}

/// A single column value in a partial write.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Int(i64),
    Decimal(Decimal),
    Date(NaiveDate),
    Null,
}

impl FieldValue {
    pub fn text_or_null(v: Option<&str>) -> Self {
        match v {
            Some(s) => FieldValue::Text(s.to_string()),
            None => FieldValue::Null,
        }
    }
}

impl ToSql for FieldValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            FieldValue::Text(s) => s.to_sql(),
            FieldValue::Int(i) => i.to_sql(),
            FieldValue::Decimal(d) => Ok(ToSqlOutput::from(d.to_string())),
            FieldValue::Date(d) => Ok(ToSqlOutput::from(d.format("%Y-%m-%d").to_string())),
            FieldValue::Null => Ok(ToSqlOutput::from(Null)),
        }
    }
}

/// Column name -> new value. Ordered so generated SQL is stable.
pub type FieldMap = BTreeMap<&'static str, FieldValue>;

pub trait EntityStore {
    fn get(&self, collection: Collection, id: &str) -> Result<Record, StoreError>;

    /// Partial write; only the named fields change.
    fn update(&self, collection: Collection, id: &str, fields: &FieldMap) -> Result<(), StoreError>;

    fn insert_transaction(&self, tx: &Transaction) -> Result<(), StoreError>;

    fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError>;

    /// Every transaction linked to `card_id`, in any period or status.
    fn transactions_for_card(&self, card_id: &str) -> Result<Vec<Transaction>, StoreError>;

    /// Run `f` so its writes are kept together: an error rolls all of them back.
    fn atomically<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce() -> Result<T, StoreError>,
    {
        f()
    }
}

/// Optional filters for [`SqliteStore::list_transactions`].
#[derive(Debug, Clone, Default)]
pub struct TxFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub account_id: Option<String>,
    pub credit_card_id: Option<String>,
    pub limit: Option<usize>,
}

const TX_COLUMNS: &str = "id, type, amount, status, date, description, account_id, account_name, \
     category_id, category_name, category_icon, to_account_id, to_account_name, \
     credit_card_id, credit_card_name";

pub struct SqliteStore<'c> {
    conn: &'c Connection,
    owner: String,
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c Connection, owner: impl Into<String>) -> Self {
        Self {
            conn,
            owner: owner.into(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn conn(&self) -> &Connection {
        self.conn
    }

    pub fn insert_account(&self, a: &Account) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO accounts(id, owner_id, name) VALUES (?1, ?2, ?3)",
            params![a.id, self.owner, a.name],
        )?;
        Ok(())
    }

    pub fn insert_category(&self, c: &Category) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO categories(id, owner_id, name, icon) VALUES (?1, ?2, ?3, ?4)",
            params![c.id, self.owner, c.name, c.icon],
        )?;
        Ok(())
    }

    pub fn insert_card(&self, c: &CreditCard) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO credit_cards(id, owner_id, name, icon, color, credit_limit, due_day, current_used)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                c.id,
                self.owner,
                c.name,
                c.icon,
                c.color,
                c.limit.to_string(),
                c.due_day,
                c.current_used.to_string()
            ],
        )?;
        Ok(())
    }

    pub fn insert_goal(&self, g: &Goal) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO goals(id, owner_id, name, target_amount, current_amount, timeframe, icon)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                g.id,
                self.owner,
                g.name,
                g.target_amount.to_string(),
                g.current_amount.to_string(),
                g.timeframe.as_str(),
                g.icon
            ],
        )?;
        Ok(())
    }

    pub fn list_accounts(&self) -> Result<Vec<Account>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM accounts WHERE owner_id=?1 ORDER BY name")?;
        let rows = stmt.query_map(params![self.owner], |r| {
            Ok(Account {
                id: r.get(0)?,
                name: r.get(1)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, icon FROM categories WHERE owner_id=?1 ORDER BY name")?;
        let rows = stmt.query_map(params![self.owner], |r| {
            Ok(Category {
                id: r.get(0)?,
                name: r.get(1)?,
                icon: r.get(2)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn list_cards(&self) -> Result<Vec<CreditCard>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, icon, color, credit_limit, due_day, current_used
             FROM credit_cards WHERE owner_id=?1 ORDER BY name",
        )?;
        let mut rows = stmt.query(params![self.owner])?;
        let mut out = Vec::new();
        while let Some(r) = rows.next()? {
            out.push(read_card(r)?);
        }
        Ok(out)
    }

    pub fn list_goals(&self) -> Result<Vec<Goal>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, target_amount, current_amount, timeframe, icon
             FROM goals WHERE owner_id=?1 ORDER BY name",
        )?;
        let mut rows = stmt.query(params![self.owner])?;
        let mut out = Vec::new();
        while let Some(r) = rows.next()? {
            out.push(read_goal(r)?);
        }
        Ok(out)
    }

    pub fn list_transactions(&self, filter: &TxFilter) -> Result<Vec<Transaction>, StoreError> {
        let mut sql = format!("SELECT {} FROM transactions WHERE owner_id=?", TX_COLUMNS);
        let mut params_vec: Vec<String> = vec![self.owner.clone()];

        if let Some(from) = filter.from {
            sql.push_str(" AND date>=?");
            params_vec.push(from.to_string());
        }
        if let Some(to) = filter.to {
            sql.push_str(" AND date<=?");
            params_vec.push(to.to_string());
        }
        if let Some(acct) = &filter.account_id {
            sql.push_str(" AND (account_id=? OR to_account_id=?)");
            params_vec.push(acct.clone());
            params_vec.push(acct.clone());
        }
        if let Some(card) = &filter.credit_card_id {
            sql.push_str(" AND credit_card_id=?");
            params_vec.push(card.clone());
        }
        sql.push_str(" ORDER BY date DESC, created_at DESC, id DESC");
        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(rusqlite::params_from_iter(params_vec.iter()))?;
        let mut out = Vec::new();
        while let Some(r) = rows.next()? {
            out.push(read_transaction(r)?);
        }
        Ok(out)
    }

    pub fn transactions_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Transaction>, StoreError> {
        self.list_transactions(&TxFilter {
            from: Some(from),
            to: Some(to),
            ..TxFilter::default()
        })
    }

    fn get_row<T>(
        &self,
        collection: Collection,
        columns: &str,
        id: &str,
        read: impl Fn(&Row<'_>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id=?1 AND owner_id=?2",
            columns,
            collection.table()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params![id, self.owner])?;
        match rows.next()? {
            Some(r) => read(r),
            None => Err(StoreError::NotFound {
                collection: collection.label(),
                id: id.to_string(),
            }),
        }
    }
}

impl EntityStore for SqliteStore<'_> {
    fn atomically<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce() -> Result<T, StoreError>,
    {
        // dropped without commit on error, which rolls back
        let tx = self.conn.unchecked_transaction()?;
        let out = f()?;
        tx.commit()?;
        Ok(out)
    }

    fn get(&self, collection: Collection, id: &str) -> Result<Record, StoreError> {
        match collection {
            Collection::Accounts => self.get_row(collection, "id, name", id, |r| {
                Ok(Record::Account(Account {
                    id: r.get(0)?,
                    name: r.get(1)?,
                }))
            }),
            Collection::Categories => self.get_row(collection, "id, name, icon", id, |r| {
                Ok(Record::Category(Category {
                    id: r.get(0)?,
                    name: r.get(1)?,
                    icon: r.get(2)?,
                }))
            }),
            Collection::CreditCards => self.get_row(
                collection,
                "id, name, icon, color, credit_limit, due_day, current_used",
                id,
                |r| read_card(r).map(Record::CreditCard),
            ),
            Collection::Transactions => self.get_row(collection, TX_COLUMNS, id, |r| {
                read_transaction(r).map(Record::Transaction)
            }),
            Collection::Goals => self.get_row(
                collection,
                "id, name, target_amount, current_amount, timeframe, icon",
                id,
                |r| read_goal(r).map(Record::Goal),
            ),
        }
    }

    fn update(&self, collection: Collection, id: &str, fields: &FieldMap) -> Result<(), StoreError> {
        if fields.is_empty() {
            return Ok(());
        }
        let writable = collection.writable();
        let mut sets = Vec::with_capacity(fields.len());
        let mut values: Vec<&dyn ToSql> = Vec::with_capacity(fields.len() + 2);
        for (i, (col, val)) in fields.iter().enumerate() {
            if !writable.contains(col) {
                return Err(StoreError::UnknownField {
                    collection: collection.label(),
                    field: *col,
                });
            }
            sets.push(format!("{}=?{}", col, i + 1));
            values.push(val);
        }
        let n = fields.len();
        let sql = format!(
            "UPDATE {} SET {} WHERE id=?{} AND owner_id=?{}",
            collection.table(),
            sets.join(", "),
            n + 1,
            n + 2
        );
        values.push(&id);
        values.push(&self.owner);
        let changed = self.conn.execute(&sql, values.as_slice())?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                collection: collection.label(),
                id: id.to_string(),
            });
        }
        log::debug!("updated {} '{}' ({} field(s))", collection.label(), id, n);
        Ok(())
    }

    fn insert_transaction(&self, tx: &Transaction) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO transactions(id, owner_id, type, amount, status, date, description,
                account_id, account_name, category_id, category_name, category_icon,
                to_account_id, to_account_name, credit_card_id, credit_card_name)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            params![
                tx.id,
                self.owner,
                tx.r#type.as_str(),
                tx.amount.to_string(),
                tx.status.as_str(),
                tx.date.to_string(),
                tx.description,
                tx.account_id,
                tx.account_name,
                tx.category_id,
                tx.category_name,
                tx.category_icon,
                tx.to_account_id,
                tx.to_account_name,
                tx.credit_card_id,
                tx.credit_card_name
            ],
        )?;
        Ok(())
    }

    fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        let sql = format!(
            "DELETE FROM {} WHERE id=?1 AND owner_id=?2",
            collection.table()
        );
        let changed = self.conn.execute(&sql, params![id, self.owner])?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                collection: collection.label(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    fn transactions_for_card(&self, card_id: &str) -> Result<Vec<Transaction>, StoreError> {
        self.list_transactions(&TxFilter {
            credit_card_id: Some(card_id.to_string()),
            ..TxFilter::default()
        })
    }
}

fn decimal_col(r: &Row<'_>, idx: usize, field: &'static str) -> Result<Decimal, StoreError> {
    let s: String = r.get(idx)?;
    s.parse::<Decimal>()
        .map_err(|_| StoreError::Corrupt { field, value: s })
}

fn read_card(r: &Row<'_>) -> Result<CreditCard, StoreError> {
    Ok(CreditCard {
        id: r.get(0)?,
        name: r.get(1)?,
        icon: r.get(2)?,
        color: r.get(3)?,
        limit: decimal_col(r, 4, "credit_limit")?,
        due_day: r.get(5)?,
        current_used: decimal_col(r, 6, "current_used")?,
    })
}

fn read_goal(r: &Row<'_>) -> Result<Goal, StoreError> {
    let timeframe: String = r.get(4)?;
    Ok(Goal {
        id: r.get(0)?,
        name: r.get(1)?,
        target_amount: decimal_col(r, 2, "target_amount")?,
        current_amount: decimal_col(r, 3, "current_amount")?,
        timeframe: timeframe.parse().map_err(|_| StoreError::Corrupt {
            field: "timeframe",
            value: timeframe.clone(),
        })?,
        icon: r.get(5)?,
    })
}

fn read_transaction(r: &Row<'_>) -> Result<Transaction, StoreError> {
    let kind: String = r.get(1)?;
    let status: String = r.get(3)?;
    let date: String = r.get(4)?;
    Ok(Transaction {
        id: r.get(0)?,
        r#type: kind.parse().map_err(|_| StoreError::Corrupt {
            field: "type",
            value: kind.clone(),
        })?,
        amount: decimal_col(r, 2, "amount")?,
        status: status.parse().map_err(|_| StoreError::Corrupt {
            field: "status",
            value: status.clone(),
        })?,
        date: NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|_| StoreError::Corrupt {
            field: "date",
            value: date.clone(),
        })?,
        description: r.get(5)?,
        account_id: r.get(6)?,
        account_name: r.get(7)?,
        category_id: r.get(8)?,
        category_name: r.get(9)?,
        category_icon: r.get(10)?,
        to_account_id: r.get(11)?,
        to_account_name: r.get(12)?,
        credit_card_id: r.get(13)?,
        credit_card_name: r.get(14)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TxType;

    fn store(conn: &Connection) -> SqliteStore<'_> {
        SqliteStore::new(conn, "owner-1")
    }

    #[test]
    fn get_is_scoped_by_owner() {
        let conn = crate::db::open_in_memory().unwrap();
        let s = store(&conn);
        s.insert_account(&Account {
            id: "acc1".into(),
            name: "Caixa".into(),
        })
        .unwrap();

        assert_eq!(s.get(Collection::Accounts, "acc1").unwrap().name(), "Caixa");
        let other = SqliteStore::new(&conn, "owner-2");
        assert!(other.get(Collection::Accounts, "acc1").unwrap_err().is_not_found());
    }

    #[test]
    fn partial_update_touches_only_named_fields() {
        let conn = crate::db::open_in_memory().unwrap();
        let s = store(&conn);
        let mut tx = Transaction::new("t1", TxType::Expense, Decimal::from(100), NaiveDate::from_ymd_opt(2025, 3, 4).unwrap());
        tx.description = Some("Lunch".into());
        tx.account_id = Some("acc1".into());
        tx.account_name = Some("Caixa".into());
        s.insert_transaction(&tx).unwrap();

        let mut fields = FieldMap::new();
        fields.insert("amount", FieldValue::Decimal(Decimal::from(250)));
        fields.insert("account_name", FieldValue::Null);
        s.update(Collection::Transactions, "t1", &fields).unwrap();

        let Record::Transaction(got) = s.get(Collection::Transactions, "t1").unwrap() else {
            panic!("expected a transaction");
        };
        assert_eq!(got.amount, Decimal::from(250));
        assert_eq!(got.account_name, None);
        assert_eq!(got.account_id.as_deref(), Some("acc1"));
        assert_eq!(got.description.as_deref(), Some("Lunch"));
    }

    #[test]
    fn update_rejects_unknown_columns_and_missing_rows() {
        let conn = crate::db::open_in_memory().unwrap();
        let s = store(&conn);
        let mut fields = FieldMap::new();
        fields.insert("owner_id", FieldValue::Text("x".into()));
        assert!(matches!(
            s.update(Collection::Transactions, "t1", &fields),
            Err(StoreError::UnknownField { .. })
        ));

        let mut fields = FieldMap::new();
        fields.insert("name", FieldValue::Text("x".into()));
        assert!(s.update(Collection::Accounts, "missing", &fields).unwrap_err().is_not_found());
    }
}
