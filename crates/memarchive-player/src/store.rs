//! JSON file record store.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use memarchive_core::error::StoreError;
use memarchive_core::store::KeyValueStore;
use tracing::warn;

const RECORDS_FILE: &str = "records.json";

/// Keeps every record in one JSON object file inside the state directory.
///
/// Writes go to a sibling temporary file that is renamed over the original,
/// so a crash never leaves a half-written document behind.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Opens the store inside `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be created.
    pub fn open(dir: &Path) -> std::io::Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            path: dir.join(RECORDS_FILE),
            lock: Mutex::new(()),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self, key: &str) -> Result<BTreeMap<String, String>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(unavailable(key, &e)),
        };
        serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt {
            key: key.to_owned(),
            reason: e.to_string(),
        })
    }

    fn write_all(&self, key: &str, records: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let body = serde_json::to_string_pretty(records).map_err(|e| StoreError::Corrupt {
            key: key.to_owned(),
            reason: e.to_string(),
        })?;
        let temp = self.path.with_extension("json.tmp");
        fs::write(&temp, body).map_err(|e| unavailable(key, &e))?;
        fs::rename(&temp, &self.path).map_err(|e| unavailable(key, &e))
    }

    fn update(&self, key: &str, change: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut records = match self.read_all(key) {
            Ok(records) => records,
            Err(StoreError::Corrupt { reason, .. }) => {
                warn!(path = %self.path.display(), %reason, "replacing corrupt record file");
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        change(&mut records);
        self.write_all(key, &records)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read_all(key)?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.update(key, |records| {
            records.insert(key.to_owned(), value.to_owned());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.update(key, |records| {
            records.remove(key);
        })
    }
}

fn unavailable(key: &str, error: &std::io::Error) -> StoreError {
    StoreError::Unavailable {
        key: key.to_owned(),
        reason: error.to_string(),
    }
}
