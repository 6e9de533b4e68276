use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::debug;

use crate::models::AttendanceSnapshot;

/// Persistence backend for the ledger. The whole collection is read and
/// written as one unit; there is no per-entry update. Concurrent writers
/// are last-write-wins at ledger granularity.
pub trait LedgerStore: Send + Sync {
    fn load_all(&self) -> Result<Vec<AttendanceSnapshot>>;
    fn save_all(&self, snapshots: &[AttendanceSnapshot]) -> Result<()>;
}

/// File-backed ledger: a single JSON array on disk.
///
/// Writes go through a temp file and rename, so a crash mid-save leaves the
/// previous ledger intact rather than a torn file. Two processes saving at
/// once still race at whole-ledger granularity.
pub struct FileLedgerStore {
    path: PathBuf,
}

impl FileLedgerStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl LedgerStore for FileLedgerStore {
    fn load_all(&self) -> Result<Vec<AttendanceSnapshot>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read ledger file: {}", self.path.display()))?;
        let snapshots = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse ledger file: {}", self.path.display()))?;
        Ok(snapshots)
    }

    fn save_all(&self, snapshots: &[AttendanceSnapshot]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create ledger dir: {}", parent.display()))?;
        }
        let contents = serde_json::to_string_pretty(snapshots)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, contents)
            .with_context(|| format!("Failed to write ledger file: {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace ledger file: {}", self.path.display()))?;
        debug!(path = %self.path.display(), count = snapshots.len(), "Ledger saved");
        Ok(())
    }
}

/// In-memory ledger for tests and in-process use.
#[derive(Default)]
pub struct MemoryLedgerStore {
    entries: Mutex<Vec<AttendanceSnapshot>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn load_all(&self) -> Result<Vec<AttendanceSnapshot>> {
        Ok(self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("Ledger store lock poisoned"))?
            .clone())
    }

    fn save_all(&self, snapshots: &[AttendanceSnapshot]) -> Result<()> {
        *self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("Ledger store lock poisoned"))? = snapshots.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileLedgerStore::new(dir.path().join("ledger.json"));
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileLedgerStore::new(dir.path().join("ledger.json"));

        let snapshots = vec![AttendanceSnapshot::new("10-A", "2026-02-01", vec![])];
        store.save_all(&snapshots).unwrap();

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].class_name, "10-A");
        assert_eq!(loaded[0].date, "2026-02-01");

        // No temp file left behind after the rename
        assert!(!dir.path().join("ledger.json.tmp").exists());
    }

    #[test]
    fn test_file_store_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        std::fs::write(&path, "not json{").unwrap();

        let store = FileLedgerStore::new(path);
        assert!(store.load_all().is_err());
    }
}
