//! Student record storage - owns the durable `students` table.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::error::Result;

const STUDENTS_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("students");

/// A persisted student record.
///
/// Records are immutable once created: the store exposes no update or delete
/// operation. Ids start at 1 and increase monotonically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: u64,
    pub name: String,
    pub age: u32,
    pub grade: String,
}

/// Serialized table value. The id lives in the key, not the value.
#[derive(Debug, Serialize, Deserialize)]
struct StudentFields {
    name: String,
    age: u32,
    grade: String,
}

/// Student record repository backed by a redb table.
///
/// `insert` is the sole mutator. Id assignment happens inside the same write
/// transaction as the insert, and redb serializes write transactions, so
/// concurrent inserts can never be assigned the same id.
#[derive(Debug, Clone)]
pub struct StudentStorage {
    db: Arc<Database>,
}

impl StudentStorage {
    /// Open the storage, creating the `students` table if it does not exist.
    /// Safe to call on every startup.
    pub fn new(db: Arc<Database>) -> Result<Self> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(STUDENTS_TABLE)?;
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Insert a new student and return the assigned id.
    ///
    /// Name and grade are trimmed before storage; age must already be a
    /// validated integer.
    pub fn insert(&self, name: &str, age: u32, grade: &str) -> Result<u64> {
        let fields = StudentFields {
            name: name.trim().to_string(),
            age,
            grade: grade.trim().to_string(),
        };
        let value = serde_json::to_vec(&fields)?;

        let write_txn = self.db.begin_write()?;
        let id = {
            let mut table = write_txn.open_table(STUDENTS_TABLE)?;
            let next_id = match table.last()? {
                Some((key, _)) => key.value() + 1,
                None => 1,
            };
            table.insert(next_id, value.as_slice())?;
            next_id
        };
        write_txn.commit()?;

        debug!("Inserted student #{} ({})", id, fields.name);
        Ok(id)
    }

    /// Return up to `limit` records, most recently inserted first.
    pub fn list_recent(&self, limit: usize) -> Result<Vec<Student>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(STUDENTS_TABLE)?;

        let mut students = Vec::new();
        for item in table.iter()?.rev().take(limit) {
            let (key, value) = item?;
            students.push(Self::decode(key.value(), value.value())?);
        }

        Ok(students)
    }

    /// Return every record in ascending id order, for deterministic export.
    pub fn list_all(&self) -> Result<Vec<Student>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(STUDENTS_TABLE)?;

        let mut students = Vec::new();
        for item in table.iter()? {
            let (key, value) = item?;
            students.push(Self::decode(key.value(), value.value())?);
        }

        Ok(students)
    }

    fn decode(id: u64, value: &[u8]) -> Result<Student> {
        let fields: StudentFields = serde_json::from_slice(value)?;
        Ok(Student {
            id,
            name: fields.name,
            age: fields.age,
            grade: fields.grade,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_storage() -> (StudentStorage, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Arc::new(Database::create(db_path).unwrap());
        (StudentStorage::new(db).unwrap(), dir)
    }

    #[test]
    fn test_insert_assigns_monotonic_ids_from_one() {
        let (storage, _dir) = test_storage();

        let first = storage.insert("Ann", 10, "4B").unwrap();
        let second = storage.insert("Bob", 11, "5A").unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 2);
    }

    #[test]
    fn test_insert_trims_name_and_grade() {
        let (storage, _dir) = test_storage();

        let id = storage.insert("  Ann  ", 10, " 4B ").unwrap();
        let students = storage.list_all().unwrap();

        assert_eq!(students.len(), 1);
        assert_eq!(students[0].id, id);
        assert_eq!(students[0].name, "Ann");
        assert_eq!(students[0].grade, "4B");
        assert_eq!(students[0].age, 10);
    }

    #[test]
    fn test_list_recent_returns_descending_ids() {
        let (storage, _dir) = test_storage();

        for i in 1..=5u32 {
            storage.insert(&format!("student-{i}"), i, "1A").unwrap();
        }

        let recent = storage.list_recent(3).unwrap();
        let ids: Vec<u64> = recent.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![5, 4, 3]);
    }

    #[test]
    fn test_list_recent_with_limit_above_count() {
        let (storage, _dir) = test_storage();

        storage.insert("Ann", 10, "4B").unwrap();
        storage.insert("Bob", 11, "5A").unwrap();

        let recent = storage.list_recent(10).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id, 2);
    }

    #[test]
    fn test_list_all_returns_ascending_ids() {
        let (storage, _dir) = test_storage();

        storage.insert("Ann", 10, "4B").unwrap();
        storage.insert("Bob", 11, "5A").unwrap();
        storage.insert("Cal", 12, "6C").unwrap();

        let all = storage.list_all().unwrap();
        let ids: Vec<u64> = all.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_storage_lists_nothing() {
        let (storage, _dir) = test_storage();

        assert!(storage.list_recent(10).unwrap().is_empty());
        assert!(storage.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_table_initialization_is_idempotent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Arc::new(Database::create(db_path).unwrap());

        let storage = StudentStorage::new(db.clone()).unwrap();
        storage.insert("Ann", 10, "4B").unwrap();

        // Re-opening over the same database must keep existing records.
        let reopened = StudentStorage::new(db).unwrap();
        assert_eq!(reopened.list_all().unwrap().len(), 1);
    }
}
