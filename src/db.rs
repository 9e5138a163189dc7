use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{Connection, Row};
use rust_decimal::Decimal;

use crate::error::{CadenceError, Result};
use crate::models::{EntryKind, Frequency, Transaction, TransactionDraft};
use crate::store::TransactionStore;

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY,
    profile_id TEXT NOT NULL,
    kind TEXT NOT NULL,
    description TEXT NOT NULL,
    amount TEXT NOT NULL,
    date TEXT NOT NULL,
    category_id TEXT,
    frequency TEXT,
    source_template_id TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_transactions_profile_kind
    ON transactions (profile_id, kind);
";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

fn conversion_error(idx: usize, err: impl std::error::Error + Send + Sync + 'static) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn row_to_transaction(row: &Row) -> rusqlite::Result<Transaction> {
    let id: i64 = row.get(0)?;
    let kind: String = row.get(2)?;
    let amount: String = row.get(4)?;
    let date: String = row.get(5)?;
    let frequency: Option<String> = row.get(7)?;
    Ok(Transaction {
        id: id.to_string(),
        profile_id: row.get(1)?,
        kind: EntryKind::from_str(&kind).map_err(|e| conversion_error(2, e))?,
        description: row.get(3)?,
        amount: Decimal::from_str(&amount).map_err(|e| conversion_error(4, e))?,
        date: NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|e| conversion_error(5, e))?,
        category_id: row.get(6)?,
        frequency: frequency
            .map(|f| Frequency::from_str(&f))
            .transpose()
            .map_err(|e| conversion_error(7, e))?,
        source_template_id: row.get(8)?,
    })
}

pub fn count_transactions(conn: &Connection, profile_id: Option<&str>) -> Result<Vec<(String, i64)>> {
    let mut stmt = conn.prepare(
        "SELECT kind, count(*) FROM transactions \
         WHERE ?1 IS NULL OR profile_id = ?1 GROUP BY kind ORDER BY kind",
    )?;
    let rows = stmt
        .query_map([profile_id], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Durable transaction store for one kind over a shared SQLite connection.
#[derive(Clone)]
pub struct SqliteTransactionStore {
    conn: Arc<Mutex<Connection>>,
    kind: EntryKind,
}

impl SqliteTransactionStore {
    pub fn new(conn: Arc<Mutex<Connection>>, kind: EntryKind) -> Self {
        Self { conn, kind }
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| CadenceError::Store("database connection lock poisoned".into()))?;
        f(&conn)
    }
}

#[async_trait]
impl TransactionStore for SqliteTransactionStore {
    fn kind(&self) -> EntryKind {
        self.kind
    }

    async fn list(&self, profile_id: &str) -> Result<Vec<Transaction>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT id, profile_id, kind, description, amount, date, category_id, frequency, source_template_id \
                 FROM transactions WHERE profile_id = ?1 AND kind = ?2 ORDER BY date, id",
            )?;
            let rows = stmt
                .query_map(rusqlite::params![profile_id, self.kind.as_str()], row_to_transaction)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    async fn create(&self, profile_id: &str, draft: &TransactionDraft) -> Result<String> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO transactions (profile_id, kind, description, amount, date, category_id, frequency, source_template_id) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    profile_id,
                    self.kind.as_str(),
                    draft.description,
                    draft.amount.to_string(),
                    draft.date.format("%Y-%m-%d").to_string(),
                    draft.category_id,
                    draft.frequency.map(|f| f.as_str()),
                    draft.source_template_id,
                ],
            )?;
            Ok(conn.last_insert_rowid().to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn test_db() -> (tempfile::TempDir, Arc<Mutex<Connection>>) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, Arc::new(Mutex::new(conn)))
    }

    fn salary(day: u32) -> TransactionDraft {
        TransactionDraft {
            kind: EntryKind::Income,
            profile_id: "p1".to_string(),
            description: "Salary".to_string(),
            amount: dec!(2500.00),
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            category_id: None,
            frequency: Some(Frequency::Fortnightly),
            source_template_id: Some("recurring_1".to_string()),
        }
    }

    #[test]
    fn test_init_db_creates_tables() {
        let (_dir, conn) = test_db();
        let conn = conn.lock().unwrap();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        assert!(tables.contains(&"transactions".to_string()));
    }

    #[test]
    fn test_init_db_is_idempotent() {
        let (_dir, conn) = test_db();
        init_db(&conn.lock().unwrap()).unwrap();
    }

    #[tokio::test]
    async fn test_create_and_list_roundtrip() {
        let (_dir, conn) = test_db();
        let store = SqliteTransactionStore::new(conn, EntryKind::Income);
        let id = store.create("p1", &salary(5)).await.unwrap();
        let rows = store.list("p1").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, id);
        assert_eq!(rows[0].amount, dec!(2500));
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(rows[0].frequency, Some(Frequency::Fortnightly));
        assert_eq!(rows[0].source_template_id.as_deref(), Some("recurring_1"));
    }

    #[tokio::test]
    async fn test_list_is_scoped_to_kind_and_profile() {
        let (_dir, conn) = test_db();
        let incomes = SqliteTransactionStore::new(conn.clone(), EntryKind::Income);
        let expenses = SqliteTransactionStore::new(conn.clone(), EntryKind::Expense);
        incomes.create("p1", &salary(5)).await.unwrap();
        incomes.create("p2", &salary(5)).await.unwrap();
        assert_eq!(incomes.list("p1").await.unwrap().len(), 1);
        assert!(expenses.list("p1").await.unwrap().is_empty());

        let counts = count_transactions(&conn.lock().unwrap(), None).unwrap();
        assert_eq!(counts, vec![("income".to_string(), 2)]);
    }

    #[tokio::test]
    async fn test_no_uniqueness_constraint() {
        let (_dir, conn) = test_db();
        let store = SqliteTransactionStore::new(conn, EntryKind::Income);
        store.create("p1", &salary(5)).await.unwrap();
        store.create("p1", &salary(5)).await.unwrap();
        assert_eq!(store.list("p1").await.unwrap().len(), 2);
    }
}
