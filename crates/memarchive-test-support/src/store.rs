//! Test stores — mock `KeyValueStore` implementations for tests.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use memarchive_core::error::StoreError;
use memarchive_core::store::KeyValueStore;

/// An in-memory store. Clones share the same records, so a test can keep a
/// handle after moving a clone into the system under test.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<BTreeMap<String, String>>>,
    writes: Arc<Mutex<Vec<String>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with one record.
    #[must_use]
    pub fn with_record(key: &str, value: &str) -> Self {
        let store = Self::new();
        store
            .records
            .lock()
            .unwrap()
            .insert(key.to_owned(), value.to_owned());
        store
    }

    /// Returns the current value of a record.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn record(&self, key: &str) -> Option<String> {
        self.records.lock().unwrap().get(key).cloned()
    }

    /// Keys written (set or removed), in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.records.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.records
            .lock()
            .unwrap()
            .insert(key.to_owned(), value.to_owned());
        self.writes.lock().unwrap().push(key.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.records.lock().unwrap().remove(key);
        self.writes.lock().unwrap().push(key.to_owned());
        Ok(())
    }
}

/// A store whose every call reports unavailable storage.
#[derive(Debug, Clone, Copy)]
pub struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Err(unavailable(key))
    }

    fn set(&self, key: &str, _value: &str) -> Result<(), StoreError> {
        Err(unavailable(key))
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        Err(unavailable(key))
    }
}

fn unavailable(key: &str) -> StoreError {
    StoreError::Unavailable {
        key: key.to_owned(),
        reason: "quota exceeded".into(),
    }
}

/// A store returning undecodable bytes for every record but accepting
/// writes.
#[derive(Debug, Clone, Default)]
pub struct CorruptStore {
    inner: MemoryStore,
}

impl CorruptStore {
    /// Creates a corrupt store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The records written since creation.
    #[must_use]
    pub fn written(&self) -> &MemoryStore {
        &self.inner
    }
}

impl KeyValueStore for CorruptStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .inner
            .get(key)?
            .or_else(|| Some("{not json".to_owned())))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.inner.remove(key)
    }
}
