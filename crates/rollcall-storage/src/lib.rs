//! Rollcall Storage - durable record persistence.
//!
//! This crate provides the persistence layer for rollcall, using redb as the
//! embedded database. It owns the `students` table; dialogue sessions are
//! deliberately not persisted and live in rollcall-core.

pub mod error;
pub mod student;

use std::path::Path;
use std::sync::Arc;

use redb::Database;

pub use error::{Result, StorageError};
pub use student::{Student, StudentStorage};

/// Central storage manager that initializes all storage subsystems.
pub struct Storage {
    pub students: StudentStorage,
}

impl Storage {
    /// Open (or create) the database at the given path and initialize all
    /// required tables. Safe to call on every startup.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Arc::new(Database::create(path)?);
        let students = StudentStorage::new(db)?;

        Ok(Self { students })
    }
}
