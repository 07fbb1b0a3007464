//! Durable key/value storage abstraction.

use crate::error::StoreError;

/// Best-effort durable string records.
///
/// Each record is read and written as a whole; absent records read as
/// `Ok(None)`.
pub trait KeyValueStore: Send + Sync {
    /// Reads the record stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the storage cannot be reached.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replaces the record stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the write does not complete.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Deletes the record stored under `key`. Deleting an absent record
    /// succeeds.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the delete does not complete.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}
