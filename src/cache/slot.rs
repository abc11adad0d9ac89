//! Persistent key-value slot capability
//!
//! The freshness cache stores one JSON document under a fixed key. The
//! slot is injected rather than global so tests run against an in-memory
//! fake and the storage location stays an operator decision.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::types::{Result, VantageError};

/// Get/set/delete by key. Implementations persist a set() durably enough
/// that a read after process restart sees it (the in-memory fake being the
/// deliberate exception).
pub trait KvSlot: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn delete(&self, key: &str) -> Result<()>;
}

/// File-backed slot: one file per key under a directory, written via a
/// temp file and rename so readers never observe a torn entry.
pub struct FileSlot {
    dir: PathBuf,
}

impl FileSlot {
    pub fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).map_err(|e| {
            VantageError::CacheSlot(format!("Failed to create cache dir {}: {}", dir.display(), e))
        })?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are fixed crate-internal identifiers, never user input
        self.dir.join(format!("{key}.json"))
    }
}

impl KvSlot for FileSlot {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(VantageError::CacheSlot(format!("Read of '{key}' failed: {e}"))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");

        fs::write(&tmp, value)
            .map_err(|e| VantageError::CacheSlot(format!("Write of '{key}' failed: {e}")))?;
        fs::rename(&tmp, &path)
            .map_err(|e| VantageError::CacheSlot(format!("Commit of '{key}' failed: {e}")))?;

        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(VantageError::CacheSlot(format!("Delete of '{key}' failed: {e}"))),
        }
    }
}

/// In-memory slot for tests and dev mode. Not persistent by design.
#[derive(Default)]
pub struct MemorySlot {
    entries: Mutex<HashMap<String, String>>,
}

impl KvSlot for MemorySlot {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_slot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let slot = FileSlot::new(dir.path().to_path_buf()).unwrap();

        assert_eq!(slot.get("counts").unwrap(), None);

        slot.set("counts", r#"{"a":1}"#).unwrap();
        assert_eq!(slot.get("counts").unwrap().as_deref(), Some(r#"{"a":1}"#));

        // A second slot over the same directory sees the entry (restart survival)
        let reopened = FileSlot::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(reopened.get("counts").unwrap().as_deref(), Some(r#"{"a":1}"#));

        slot.delete("counts").unwrap();
        assert_eq!(slot.get("counts").unwrap(), None);

        // Deleting an absent key is fine
        slot.delete("counts").unwrap();
    }

    #[test]
    fn test_set_replaces_prior_entry() {
        let dir = tempfile::tempdir().unwrap();
        let slot = FileSlot::new(dir.path().to_path_buf()).unwrap();

        slot.set("counts", "old").unwrap();
        slot.set("counts", "new").unwrap();
        assert_eq!(slot.get("counts").unwrap().as_deref(), Some("new"));
    }

    #[test]
    fn test_memory_slot() {
        let slot = MemorySlot::default();
        slot.set("k", "v").unwrap();
        assert_eq!(slot.get("k").unwrap().as_deref(), Some("v"));
        slot.delete("k").unwrap();
        assert_eq!(slot.get("k").unwrap(), None);
    }
}
