use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::debug;

/// The two storage tiers selectable by the remember-me flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Survives restarts (file-backed). Selected when remember-me is set.
    Durable,
    /// Lives for the current process only (in-memory).
    Ephemeral,
}

/// The session keys written at login and removed together at teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    Token,
    RememberMe,
    User,
    TokenExpiry,
}

impl StoreKey {
    pub const ALL: [StoreKey; 4] = [
        StoreKey::Token,
        StoreKey::RememberMe,
        StoreKey::User,
        StoreKey::TokenExpiry,
    ];

    /// Stable storage name, shared by both tiers.
    pub fn name(self) -> &'static str {
        match self {
            StoreKey::Token => "token",
            StoreKey::RememberMe => "rememberMe",
            StoreKey::User => "user",
            StoreKey::TokenExpiry => "tokenExpiry",
        }
    }
}

/// A single storage tier. Reads swallow backend failures (logged, treated as
/// absent) so a corrupt store degrades to "not signed in" rather than an
/// error on every request.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: StoreKey) -> Option<String>;
    fn set(&self, key: StoreKey, value: &str) -> Result<()>;
    fn remove(&self, key: StoreKey) -> Result<()>;
}

/// In-memory tier. Backs the ephemeral tier and both tiers in unit tests.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<StoreKey, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: StoreKey) -> Option<String> {
        self.values.lock().ok()?.get(&key).cloned()
    }

    fn set(&self, key: StoreKey, value: &str) -> Result<()> {
        self.values
            .lock()
            .map_err(|_| anyhow::anyhow!("Session store lock poisoned"))?
            .insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: StoreKey) -> Result<()> {
        self.values
            .lock()
            .map_err(|_| anyhow::anyhow!("Session store lock poisoned"))?
            .remove(&key);
        Ok(())
    }
}

/// File-backed tier: one JSON object map per file.
///
/// The file is re-read on every `get`, so a teardown performed by another
/// process is observed on the next request rather than at startup. Writes
/// replace the whole file atomically (temp file + rename).
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn read_map(&self) -> HashMap<String, String> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(_) => return HashMap::new(),
        };
        match serde_json::from_str(&contents) {
            Ok(map) => map,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "Ignoring unparseable session file");
                HashMap::new()
            }
        }
    }

    fn write_map(&self, map: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create session dir: {}", parent.display()))?;
        }
        let contents = serde_json::to_string_pretty(map)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, contents)
            .with_context(|| format!("Failed to write session file: {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace session file: {}", self.path.display()))?;
        Ok(())
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: StoreKey) -> Option<String> {
        self.read_map().get(key.name()).cloned()
    }

    fn set(&self, key: StoreKey, value: &str) -> Result<()> {
        let mut map = self.read_map();
        map.insert(key.name().to_string(), value.to_string());
        self.write_map(&map)
    }

    fn remove(&self, key: StoreKey) -> Result<()> {
        let mut map = self.read_map();
        if map.remove(key.name()).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }
}
