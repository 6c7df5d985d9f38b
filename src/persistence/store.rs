//! Nation storage backends

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ahash::AHashMap;

use crate::core::error::Result;
use crate::core::types::Slot;
use crate::persistence::record::NationRecord;

/// Keyed by `(user id, slot)`
pub trait NationStore: Send + Sync {
    fn load(&self, user_id: &str, slot: Slot) -> Result<Option<NationRecord>>;
    fn save(&self, record: &NationRecord) -> Result<()>;
    /// Returns whether a record was removed
    fn delete(&self, user_id: &str, slot: Slot) -> Result<bool>;
    /// Occupied slots, ascending
    fn list_slots(&self, user_id: &str) -> Result<Vec<Slot>>;
}

#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<AHashMap<(String, u8), NationRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> std::sync::MutexGuard<'_, AHashMap<(String, u8), NationRecord>> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl NationStore for MemoryStore {
    fn load(&self, user_id: &str, slot: Slot) -> Result<Option<NationRecord>> {
        Ok(self.records().get(&(user_id.to_string(), slot.get())).cloned())
    }

    fn save(&self, record: &NationRecord) -> Result<()> {
        self.records()
            .insert((record.user_id.clone(), record.slot), record.clone());
        Ok(())
    }

    fn delete(&self, user_id: &str, slot: Slot) -> Result<bool> {
        Ok(self.records().remove(&(user_id.to_string(), slot.get())).is_some())
    }

    fn list_slots(&self, user_id: &str) -> Result<Vec<Slot>> {
        let records = self.records();
        Ok(Slot::ALL
            .into_iter()
            .filter(|slot| records.contains_key(&(user_id.to_string(), slot.get())))
            .collect())
    }
}

/// One pretty-printed JSON file per nation: `{dir}/{user}/slot-{n}.json`
pub struct JsonFileStore {
    root: PathBuf,
}

/// Directory name for a user id: alphanumerics and `-` pass through, every
/// other byte becomes `_xx`, so distinct ids never share a directory
fn user_dir_name(user_id: &str) -> String {
    let mut encoded = String::with_capacity(user_id.len());
    for byte in user_id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("_{:02x}", byte));
        }
    }
    if encoded.is_empty() {
        "_".into()
    } else {
        encoded
    }
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, user_id: &str, slot: Slot) -> PathBuf {
        self.root
            .join(user_dir_name(user_id))
            .join(format!("slot-{}.json", slot))
    }
}

impl NationStore for JsonFileStore {
    fn load(&self, user_id: &str, slot: Slot) -> Result<Option<NationRecord>> {
        let path = self.path_for(user_id, slot);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record: NationRecord = serde_json::from_str(&content)?;
        if record.user_id != user_id || record.slot != slot.get() {
            tracing::warn!(
                "{} holds {}'s slot {}, not {}'s slot {}",
                path.display(),
                record.user_id,
                record.slot,
                user_id,
                slot
            );
            return Ok(None);
        }
        Ok(Some(record))
    }

    fn save(&self, record: &NationRecord) -> Result<()> {
        let slot = Slot::new(record.slot)?;
        let path = self.path_for(&record.user_id, slot);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        // write then rename so a crash never leaves half a file
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(record)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn delete(&self, user_id: &str, slot: Slot) -> Result<bool> {
        match fs::remove_file(self.path_for(user_id, slot)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn list_slots(&self, user_id: &str) -> Result<Vec<Slot>> {
        Ok(Slot::ALL
            .into_iter()
            .filter(|slot| self.path_for(user_id, *slot).is_file())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::EngineConfig;
    use crate::nation::{Nation, NewNation};
    use tempfile::TempDir;

    fn record(user: &str, slot: u8) -> NationRecord {
        let nation = Nation::create(
            NewNation::new(user, Slot::new(slot).unwrap(), "Storia"),
            0,
            &EngineConfig::default(),
        );
        NationRecord::from_nation(&nation).unwrap()
    }

    fn exercise(store: &dyn NationStore) {
        let slot = Slot::new(2).unwrap();
        assert!(store.load("ada", slot).unwrap().is_none());

        store.save(&record("ada", 2)).unwrap();
        store.save(&record("ada", 3)).unwrap();
        store.save(&record("bob", 1)).unwrap();

        assert_eq!(store.load("ada", slot).unwrap(), Some(record("ada", 2)));
        assert_eq!(
            store.list_slots("ada").unwrap(),
            vec![Slot::new(2).unwrap(), Slot::new(3).unwrap()]
        );

        assert!(store.delete("ada", slot).unwrap());
        assert!(!store.delete("ada", slot).unwrap());
        assert_eq!(store.list_slots("ada").unwrap(), vec![Slot::new(3).unwrap()]);
    }

    #[test]
    fn test_memory_store() {
        exercise(&MemoryStore::new());
    }

    #[test]
    fn test_json_file_store() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path());
        exercise(&store);
        assert!(store.path_for("ada", Slot::new(3).unwrap()).ends_with("ada/slot-3.json"));
    }

    #[test]
    fn test_user_id_cannot_escape_root() {
        let store = JsonFileStore::new("/tmp/nations");
        let path = store.path_for("../../etc", Slot::new(1).unwrap());
        assert!(path.starts_with("/tmp/nations"));
        assert!(!path.to_string_lossy().contains(".."));
    }

    #[test]
    fn test_similar_user_ids_do_not_collide() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path());
        let slot = Slot::new(1).unwrap();
        store.save(&record("ann_b", 1)).unwrap();

        assert!(store.load("ann.b", slot).unwrap().is_none());
        assert!(store.load("ann b", slot).unwrap().is_none());
        assert!(store.list_slots("ann.b").unwrap().is_empty());
        assert_eq!(store.load("ann_b", slot).unwrap().unwrap().user_id, "ann_b");

        let dirs = ["ann_b", "ann.b", "ann b", "ann_5fb", ""]
            .map(|id| store.path_for(id, slot));
        for (i, a) in dirs.iter().enumerate() {
            for b in &dirs[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_misfiled_record_is_not_loaded() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path());
        let slot = Slot::new(2).unwrap();
        let path = store.path_for("cal", slot);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, serde_json::to_string(&record("dee", 2)).unwrap()).unwrap();

        assert!(store.load("cal", slot).unwrap().is_none());
    }
}
