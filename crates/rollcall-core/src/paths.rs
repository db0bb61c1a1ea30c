use anyhow::Result;
use std::path::PathBuf;

const ROLLCALL_DIR: &str = ".rollcall";
const DB_FILE: &str = "rollcall.db";
const EXPORTS_DIR: &str = "exports";

/// Environment variable to override the rollcall directory.
const ROLLCALL_DIR_ENV: &str = "ROLLCALL_DIR";

/// Resolve the rollcall data directory.
/// Priority: ROLLCALL_DIR env var > ~/.rollcall/
pub fn resolve_rollcall_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ROLLCALL_DIR_ENV)
        && !dir.trim().is_empty()
    {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|h| h.join(ROLLCALL_DIR))
        .ok_or_else(|| anyhow::anyhow!("Failed to determine home directory"))
}

/// Ensure the rollcall directory exists and return its path.
pub fn ensure_rollcall_dir() -> Result<PathBuf> {
    let dir = resolve_rollcall_dir()?;
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Get the database path: ~/.rollcall/rollcall.db
pub fn ensure_database_path() -> Result<PathBuf> {
    Ok(ensure_rollcall_dir()?.join(DB_FILE))
}

/// Get the exports directory: ~/.rollcall/exports/
///
/// The directory itself is created lazily by the export writer.
pub fn exports_dir() -> Result<PathBuf> {
    Ok(resolve_rollcall_dir()?.join(EXPORTS_DIR))
}
