use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StoreError;

/// Slot holding the lookup history
pub const HISTORY_SLOT: &str = "ordbok_history";
/// Slot holding the saved-word list
pub const SAVED_WORDS_SLOT: &str = "ordbok_saved_words";

/// Key-value persistence, last write wins
pub trait Store: Send + Sync {
    /// Raw contents of a slot, `None` if it was never written
    fn read(&self, slot: &str) -> Result<Option<String>, StoreError>;

    fn write(&self, slot: &str, data: &str) -> Result<(), StoreError>;
}

/// Load a slot as a list of records. A missing or unreadable slot is "no data yet".
pub fn load_slot<T: DeserializeOwned>(store: &dyn Store, slot: &str) -> Vec<T> {
    let data = match store.read(slot) {
        Ok(Some(data)) => data,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!("Failed to read slot {}: {}", slot, e);
            return Vec::new();
        }
    };

    match serde_json::from_str(&data) {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!("Discarding unreadable slot {}: {}", slot, e);
            Vec::new()
        }
    }
}

pub fn save_slot<T: Serialize>(store: &dyn Store, slot: &str, records: &[T]) -> Result<(), StoreError> {
    let data = serde_json::to_string(records)?;
    store.write(slot, &data)
}

/// One JSON file per slot inside a directory
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, slot: &str) -> PathBuf {
        self.dir.join(format!("{slot}.json"))
    }
}

impl Store for JsonFileStore {
    fn read(&self, slot: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.slot_path(slot)) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, slot: &str, data: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;

        // Slot file is replaced atomically
        let path = self.slot_path(slot);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// In-process store, used by tests and when persistence is disabled
#[derive(Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn read(&self, slot: &str) -> Result<Option<String>, StoreError> {
        let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        Ok(slots.get(slot).cloned())
    }

    fn write(&self, slot: &str, data: &str) -> Result<(), StoreError> {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.insert(slot.to_string(), data.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::tests::record;
    use ordbok_types::HistoryRecord;

    #[test]
    fn missing_slot_loads_empty() {
        let store = MemoryStore::new();
        let records: Vec<HistoryRecord> = load_slot(&store, HISTORY_SLOT);
        assert!(records.is_empty());
    }

    #[test]
    fn corrupt_slot_loads_empty() {
        let store = MemoryStore::new();
        store.write(HISTORY_SLOT, "{not json").unwrap();
        let records: Vec<HistoryRecord> = load_slot(&store, HISTORY_SLOT);
        assert!(records.is_empty());
    }

    #[test]
    fn file_store_persists_slots() {
        let dir = std::env::temp_dir().join(format!("ordbok-store-{}", std::process::id()));
        let store = JsonFileStore::new(&dir);

        assert_eq!(store.read(SAVED_WORDS_SLOT).unwrap(), None);

        let records = vec![record("bil", "noun", "Spanish", 7)];
        save_slot(&store, HISTORY_SLOT, &records).unwrap();

        let reopened = JsonFileStore::new(&dir);
        let loaded: Vec<HistoryRecord> = load_slot(&reopened, HISTORY_SLOT);
        assert_eq!(loaded, records);
        assert!(dir.join("ordbok_history.json").exists());

        let _ = fs::remove_dir_all(dir);
    }
}
