//! Key/value string storage.
//!
//! `FileStore` writes one file per key and replaces it atomically
//! (temp file + rename), so an interrupted write leaves the previous value.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::{PersistenceError, PersistenceResult};

/// String storage keyed by short names.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> PersistenceResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> PersistenceResult<()>;

    fn remove(&self, key: &str) -> PersistenceResult<()>;
}

fn validate_key(key: &str) -> PersistenceResult<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(PersistenceError::InvalidKey(key.to_string()))
    }
}

/// Directory-backed store.
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) the data directory.
    pub fn open(base_dir: impl AsRef<Path>) -> PersistenceResult<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        debug!(dir = %base_dir.display(), "Opened file store");
        Ok(Self { base_dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> PersistenceResult<Option<String>> {
        validate_key(key)?;
        match fs::read_to_string(self.path_for(key)) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> PersistenceResult<()> {
        validate_key(key)?;
        let path = self.path_for(key);
        let tmp = self.base_dir.join(format!("{key}.json.tmp"));

        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }
        if let Err(e) = fs::rename(&tmp, &path) {
            warn!(?e, key, "Failed to replace stored value");
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> PersistenceResult<()> {
        validate_key(key)?;
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> PersistenceResult<Option<String>> {
        validate_key(key)?;
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> PersistenceResult<()> {
        validate_key(key)?;
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> PersistenceResult<()> {
        validate_key(key)?;
        self.entries.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        assert_eq!(store.get("settings").unwrap(), None);
        store.set("settings", r#"{"hide_unvetted":true}"#).unwrap();
        assert_eq!(
            store.get("settings").unwrap().as_deref(),
            Some(r#"{"hide_unvetted":true}"#)
        );

        store.set("settings", "{}").unwrap();
        assert_eq!(store.get("settings").unwrap().as_deref(), Some("{}"));
        assert!(!dir.path().join("settings.json.tmp").exists());

        store.remove("settings").unwrap();
        assert_eq!(store.get("settings").unwrap(), None);
        // Removing twice is fine
        store.remove("settings").unwrap();
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        FileStore::open(dir.path())
            .unwrap()
            .set("favorites", "a,b")
            .unwrap();

        let reopened = FileStore::open(dir.path()).unwrap();
        assert_eq!(reopened.get("favorites").unwrap().as_deref(), Some("a,b"));
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.set("../etc", "x"),
            Err(PersistenceError::InvalidKey(_))
        ));
        assert!(store.get("").is_err());
    }
}
