use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{CadenceError, Result};
use crate::models::{EntryKind, Transaction, TransactionDraft};

/// Remote collection of materialized transactions of one kind, keyed by
/// profile. No uniqueness is enforced; `list` order is unspecified.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    fn kind(&self) -> EntryKind;

    async fn list(&self, profile_id: &str) -> Result<Vec<Transaction>>;

    async fn create(&self, profile_id: &str, draft: &TransactionDraft) -> Result<String>;
}

/// In-process store. Supports failure injection for exercising the
/// partial-failure paths.
pub struct MemoryTransactionStore {
    kind: EntryKind,
    rows: Mutex<Vec<Transaction>>,
    next_id: AtomicUsize,
    create_calls: AtomicUsize,
    failing_creates: Mutex<HashSet<usize>>,
    failing_lists: AtomicUsize,
}

impl MemoryTransactionStore {
    pub fn new(kind: EntryKind) -> Self {
        Self {
            kind,
            rows: Mutex::new(Vec::new()),
            next_id: AtomicUsize::new(1),
            create_calls: AtomicUsize::new(0),
            failing_creates: Mutex::new(HashSet::new()),
            failing_lists: AtomicUsize::new(0),
        }
    }

    /// Make the `n`-th call to `create` (1-based, counted over the store's
    /// lifetime) fail with a store error.
    pub fn fail_create_call(&self, n: usize) {
        if let Ok(mut set) = self.failing_creates.lock() {
            set.insert(n);
        }
    }

    /// Make the next `count` calls to `list` fail with a store error.
    pub fn fail_next_lists(&self, count: usize) {
        self.failing_lists.store(count, Ordering::SeqCst);
    }

    /// Insert a row directly, bypassing failure injection.
    pub fn insert(&self, txn: Transaction) {
        if let Ok(mut rows) = self.rows.lock() {
            rows.push(txn);
        }
    }

    pub fn snapshot(&self) -> Vec<Transaction> {
        self.rows.lock().map(|rows| rows.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl TransactionStore for MemoryTransactionStore {
    fn kind(&self) -> EntryKind {
        self.kind
    }

    async fn list(&self, profile_id: &str) -> Result<Vec<Transaction>> {
        let pending = self.failing_lists.load(Ordering::SeqCst);
        if pending > 0 {
            self.failing_lists.store(pending - 1, Ordering::SeqCst);
            return Err(CadenceError::Store("list unavailable".into()));
        }
        let rows = self
            .rows
            .lock()
            .map_err(|_| CadenceError::Store("transaction store lock poisoned".into()))?;
        Ok(rows.iter().filter(|t| t.profile_id == profile_id).cloned().collect())
    }

    async fn create(&self, profile_id: &str, draft: &TransactionDraft) -> Result<String> {
        let call = self.create_calls.fetch_add(1, Ordering::SeqCst) + 1;
        let should_fail = self
            .failing_creates
            .lock()
            .map(|set| set.contains(&call))
            .unwrap_or(false);
        if should_fail {
            return Err(CadenceError::Store(format!("create #{call} rejected")));
        }

        let id = format!("{}-{}", self.kind, self.next_id.fetch_add(1, Ordering::SeqCst));
        let mut txn = draft.clone().into_transaction(id.clone());
        txn.profile_id = profile_id.to_string();
        let mut rows = self
            .rows
            .lock()
            .map_err(|_| CadenceError::Store("transaction store lock poisoned".into()))?;
        rows.push(txn);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn draft(profile: &str, day: u32) -> TransactionDraft {
        TransactionDraft {
            kind: EntryKind::Expense,
            profile_id: profile.to_string(),
            description: "Coffee".to_string(),
            amount: dec!(4.20),
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            category_id: Some("food".to_string()),
            frequency: None,
            source_template_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_then_list_by_profile() {
        let store = MemoryTransactionStore::new(EntryKind::Expense);
        store.create("p1", &draft("p1", 1)).await.unwrap();
        store.create("p2", &draft("p2", 2)).await.unwrap();
        let p1 = store.list("p1").await.unwrap();
        assert_eq!(p1.len(), 1);
        assert_eq!(p1[0].description, "Coffee");
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_injected_create_failure() {
        let store = MemoryTransactionStore::new(EntryKind::Expense);
        store.fail_create_call(2);
        assert!(store.create("p1", &draft("p1", 1)).await.is_ok());
        assert!(store.create("p1", &draft("p1", 2)).await.is_err());
        assert!(store.create("p1", &draft("p1", 3)).await.is_ok());
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_injected_list_failure_is_consumed() {
        let store = MemoryTransactionStore::new(EntryKind::Expense);
        store.fail_next_lists(1);
        assert!(store.list("p1").await.unwrap_err().is_store_error());
        assert!(store.list("p1").await.is_ok());
    }
}
