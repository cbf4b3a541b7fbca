//! Key-value backings for token and encryption key stores
//!
//! Three named backings mirror the browser storages the selectors are
//! named after:
//! - `in-memory`: private to one store instance
//! - `session-storage`: shared by every store in the process, gone on exit
//! - `local-storage`: a JSON file on disk, survives restarts

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, OnceLock, RwLock};
use tracing::warn;

/// Named backing storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoreSelector {
    #[default]
    InMemory,
    SessionStorage,
    LocalStorage,
}

impl StoreSelector {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InMemory => "in-memory",
            Self::SessionStorage => "session-storage",
            Self::LocalStorage => "local-storage",
        }
    }

    /// Construct the backing this selector names. Performs no I/O.
    pub fn open(&self) -> Box<dyn KeyValueStorage> {
        match self {
            Self::InMemory => Box::new(InMemoryStorage::new()),
            Self::SessionStorage => Box::new(SessionStorage),
            Self::LocalStorage => Box::new(LocalStorage::new(LocalStorage::default_dir())),
        }
    }
}

impl fmt::Display for StoreSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized names fall back to in-memory
impl FromStr for StoreSelector {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Infallible> {
        Ok(match s {
            "in-memory" => Self::InMemory,
            "session-storage" => Self::SessionStorage,
            "local-storage" => Self::LocalStorage,
            other => {
                warn!(selector = %other, "unrecognized store selector, using in-memory");
                Self::InMemory
            }
        })
    }
}

/// String key-value storage
pub trait KeyValueStorage: Send + Sync {
    /// Backing name reported in configuration summaries
    fn name(&self) -> &'static str;

    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}

#[derive(Default)]
pub struct InMemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for InMemoryStorage {
    fn name(&self) -> &'static str {
        StoreSelector::InMemory.as_str()
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        Ok(())
    }
}

fn session_entries() -> &'static RwLock<HashMap<String, String>> {
    static SESSION: OnceLock<RwLock<HashMap<String, String>>> = OnceLock::new();
    SESSION.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Process-wide storage
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionStorage;

impl KeyValueStorage for SessionStorage {
    fn name(&self) -> &'static str {
        StoreSelector::SessionStorage.as_str()
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = session_entries().read().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = session_entries().write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = session_entries().write().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        Ok(())
    }
}

/// File-backed storage; the file is read and written on each access
pub struct LocalStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl LocalStorage {
    const FILE_NAME: &'static str = "dialect-sdk-storage.json";

    /// Storage file under `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: dir.into().join(Self::FILE_NAME),
            lock: Mutex::new(()),
        }
    }

    pub fn default_dir() -> PathBuf {
        std::env::temp_dir().join("dialect-sdk")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<HashMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(entries) => Ok(entries),
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "unreadable storage file, starting empty");
                    Ok(HashMap::new())
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn persist(&self, entries: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_vec_pretty(entries)?)?;
        Ok(())
    }
}

impl KeyValueStorage for LocalStorage {
    fn name(&self) -> &'static str {
        StoreSelector::LocalStorage.as_str()
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_selector_falls_back_to_in_memory() {
        assert_eq!("redis".parse::<StoreSelector>().unwrap(), StoreSelector::InMemory);
        assert_eq!(
            "local-storage".parse::<StoreSelector>().unwrap(),
            StoreSelector::LocalStorage
        );
    }

    #[test]
    fn test_in_memory_instances_are_isolated() {
        let a = InMemoryStorage::new();
        let b = InMemoryStorage::new();
        a.set("k", "v").unwrap();
        assert_eq!(a.get("k").unwrap().as_deref(), Some("v"));
        assert_eq!(b.get("k").unwrap(), None);
    }

    #[test]
    fn test_session_storage_shared_across_instances() {
        let key = "session-test-shared-key";
        SessionStorage.set(key, "v").unwrap();
        assert_eq!(SessionStorage.get(key).unwrap().as_deref(), Some("v"));
        SessionStorage.remove(key).unwrap();
        assert_eq!(SessionStorage.get(key).unwrap(), None);
    }

    #[test]
    fn test_local_storage_survives_reopen() {
        let dir = std::env::temp_dir().join(format!("dialect-sdk-test-{}", std::process::id()));
        let first = LocalStorage::new(&dir);
        first.set("token", "abc").unwrap();

        let reopened = LocalStorage::new(&dir);
        assert_eq!(reopened.get("token").unwrap().as_deref(), Some("abc"));

        reopened.remove("token").unwrap();
        assert_eq!(first.get("token").unwrap(), None);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_local_storage_recovers_from_corrupt_file() {
        let dir = std::env::temp_dir().join(format!("dialect-sdk-corrupt-{}", std::process::id()));
        let storage = LocalStorage::new(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(storage.path(), "{\"token\": trunc").unwrap();

        assert_eq!(storage.get("token").unwrap(), None);
        storage.set("token", "abc").unwrap();
        assert_eq!(LocalStorage::new(&dir).get("token").unwrap().as_deref(), Some("abc"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_local_storage_construction_touches_nothing() {
        let dir = std::env::temp_dir().join("dialect-sdk-never-created");
        let storage = LocalStorage::new(&dir);
        assert!(!storage.path().exists());
    }
}
