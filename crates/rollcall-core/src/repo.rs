//! Async facade over the student storage.
//!
//! redb transactions are blocking, so every call is dispatched through
//! `spawn_blocking`. Handlers awaiting a repository call suspend instead of
//! stalling the inbound loop.

use async_trait::async_trait;
use rollcall_storage::{Result, StorageError, Student, StudentStorage};

/// The record operations the dialogue, command, and export layers use.
///
/// [`StudentRepository`] is the durable implementation; tests substitute
/// doubles to drive the failure branches.
#[async_trait]
pub trait StudentStore: Send + Sync {
    /// Insert a new student and return the assigned id.
    async fn insert(&self, name: String, age: u32, grade: String) -> Result<u64>;

    /// Up to `limit` records, most recently inserted first.
    async fn list_recent(&self, limit: usize) -> Result<Vec<Student>>;

    /// Every record in ascending id order.
    async fn list_all(&self) -> Result<Vec<Student>>;
}

/// Async student record repository backed by redb.
#[derive(Clone)]
pub struct StudentRepository {
    storage: StudentStorage,
}

impl StudentRepository {
    pub fn new(storage: StudentStorage) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl StudentStore for StudentRepository {
    async fn insert(&self, name: String, age: u32, grade: String) -> Result<u64> {
        let storage = self.storage.clone();
        spawn_storage(move || storage.insert(&name, age, &grade)).await
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<Student>> {
        let storage = self.storage.clone();
        spawn_storage(move || storage.list_recent(limit)).await
    }

    async fn list_all(&self) -> Result<Vec<Student>> {
        let storage = self.storage.clone();
        spawn_storage(move || storage.list_all()).await
    }
}

async fn spawn_storage<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StorageError::TaskJoin(e.to_string()))?
}
