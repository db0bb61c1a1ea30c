//! CSV Export Writer
//!
//! Serializes the whole `students` table to a timestamped flat file.
//!
//! The output is a naive comma join with no quoting or escaping: a value
//! containing a comma or a newline will corrupt its row. This matches the
//! documented export format (`id,name,age,grade`) and is kept deliberately
//! rather than silently switching to a quoting serializer.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::repo::StudentStore;

pub const EXPORT_HEADER: &str = "id,name,age,grade";

/// Errors surfaced by the export writer.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("repository read failed: {0}")]
    Storage(#[from] rollcall_storage::StorageError),

    #[error("export file error: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes full-table CSV snapshots into a dedicated exports directory.
pub struct ExportWriter {
    repo: Arc<dyn StudentStore>,
    exports_dir: PathBuf,
}

impl ExportWriter {
    pub fn new(repo: Arc<dyn StudentStore>, exports_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo,
            exports_dir: exports_dir.into(),
        }
    }

    /// Export every record to `students_<YYYYMMDD_HHMMSS>.csv` and return the
    /// path of the newly written file.
    ///
    /// The exports directory is created on first use. On failure no partial
    /// file path is returned.
    pub async fn export(&self) -> Result<PathBuf, ExportError> {
        let students = self.repo.list_all().await?;

        tokio::fs::create_dir_all(&self.exports_dir).await?;

        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let path = self.exports_dir.join(format!("students_{timestamp}.csv"));

        let mut contents = String::from(EXPORT_HEADER);
        contents.push('\n');
        for student in &students {
            contents.push_str(&format!(
                "{},{},{},{}\n",
                student.id, student.name, student.age, student.grade
            ));
        }

        tokio::fs::write(&path, contents).await?;

        info!("Exported {} students to {}", students.len(), path.display());
        Ok(path)
    }

    /// The directory exports are written into.
    pub fn exports_dir(&self) -> &Path {
        &self.exports_dir
    }
}
