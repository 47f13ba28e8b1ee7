//! In-Memory Author Store
//!
//! Keyed record storage shared across request handlers. All mutations
//! serialize on the write lock; id assignment is atomic so concurrent
//! inserts never collide.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::record::{Author, AuthorDraft, StoreError};

/// Records present after construction and after every reset
fn seed_records() -> Vec<Author> {
    vec![
        Author {
            id: 1,
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
        },
        Author {
            id: 2,
            name: "Alan Turing".to_string(),
            email: "alan@example.com".to_string(),
        },
    ]
}

/// In-memory author store
#[derive(Debug, Clone)]
pub struct AuthorStore {
    /// Record storage
    records: Arc<RwLock<HashMap<u64, Author>>>,

    /// Next id to assign
    next_id: Arc<AtomicU64>,
}

impl AuthorStore {
    /// Create a store populated with the seed records
    pub fn new() -> Self {
        let seed = seed_records();
        let next_id = seed.iter().map(|a| a.id).max().unwrap_or(0) + 1;
        let records = seed.into_iter().map(|a| (a.id, a)).collect();

        Self {
            records: Arc::new(RwLock::new(records)),
            next_id: Arc::new(AtomicU64::new(next_id)),
        }
    }

    /// All records, ordered by id
    pub async fn get_all(&self) -> Vec<Author> {
        let records = self.records.read().await;
        let mut all: Vec<Author> = records.values().cloned().collect();
        all.sort_by_key(|a| a.id);
        all
    }

    /// Look up a record by id; absence is a valid outcome
    pub async fn get(&self, id: u64) -> Option<Author> {
        let records = self.records.read().await;
        records.get(&id).cloned()
    }

    /// Validate and insert a new record under a freshly assigned id
    pub async fn insert(&self, draft: AuthorDraft) -> Result<Author, StoreError> {
        draft.validate()?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let author = Author {
            id,
            name: draft.name,
            email: draft.email,
        };

        let mut records = self.records.write().await;
        records.insert(id, author.clone());
        Ok(author)
    }

    /// Replace the name and email of an existing record
    pub async fn update(&self, id: u64, draft: AuthorDraft) -> Result<Author, StoreError> {
        draft.validate()?;

        let mut records = self.records.write().await;
        let record = records.get_mut(&id).ok_or(StoreError::NotFound)?;
        record.name = draft.name;
        record.email = draft.email;
        Ok(record.clone())
    }

    /// Remove and return a record
    pub async fn delete(&self, id: u64) -> Option<Author> {
        let mut records = self.records.write().await;
        records.remove(&id)
    }

    /// Restore the seed records and rewind the id counter
    pub async fn reset(&self) {
        let seed = seed_records();
        let next_id = seed.iter().map(|a| a.id).max().unwrap_or(0) + 1;

        let mut records = self.records.write().await;
        records.clear();
        records.extend(seed.into_iter().map(|a| (a.id, a)));
        self.next_id.store(next_id, Ordering::SeqCst);
    }

    /// Number of stored records
    pub async fn count(&self) -> usize {
        let records = self.records.read().await;
        records.len()
    }
}

impl Default for AuthorStore {
    fn default() -> Self {
        Self::new()
    }
}
