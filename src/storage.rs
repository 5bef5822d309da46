//! Whole-value persistence slots on top of sled.
//!
//! Each collection lives under one key and is rewritten in full on every
//! mutation. A [`Slot`] is read once when opened; if the key is missing or
//! cannot be decoded, the seed value is used instead.

use crate::error::StorageError;
use serde::{de::DeserializeOwned, Serialize};
use sled::Db;
use std::path::Path;
use tracing::{debug, warn};

pub const NOTES_KEY: &str = "notevault-notes";
pub const FOLDERS_KEY: &str = "notevault-folders";
pub const TAGS_KEY: &str = "notevault-tags";
pub const SETTINGS_KEY: &str = "notevault-settings";

// ============================================================================
// Storage
// ============================================================================

#[derive(Clone)]
pub struct Storage {
    db: Db,
}

impl Storage {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// In-memory database removed on drop.
    pub fn temporary() -> Result<Self, StorageError> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    /// Open the slot stored under `key`, falling back to `seed`.
    pub fn slot<T>(&self, key: &str, seed: T) -> Slot<T>
    where
        T: Serialize + DeserializeOwned,
    {
        let value = match self.read::<T>(key) {
            Ok(Some(value)) => value,
            Ok(None) => {
                debug!(key, "slot empty, using seed value");
                seed
            }
            Err(e) => {
                warn!(key, error = %e, "slot unreadable, using seed value");
                seed
            }
        };
        Slot {
            db: self.db.clone(),
            key: key.to_string(),
            value,
        }
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.db.get(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }
}

// ============================================================================
// Slot
// ============================================================================

/// A state handle whose mutations are eagerly written back.
pub struct Slot<T> {
    db: Db,
    key: String,
    value: T,
}

impl<T: Serialize> Slot<T> {
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Mutate the value in place, then write the whole value back.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
        let result = f(&mut self.value);
        self.persist();
        result
    }

    fn write(&self) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec(&self.value)?;
        self.db.insert(self.key.as_bytes(), bytes)?;
        Ok(())
    }

    // Fire-and-forget: a failed write leaves the in-memory value authoritative.
    fn persist(&self) {
        if let Err(e) = self.write() {
            warn!(key = %self.key, error = %e, "failed to persist slot");
        }
    }
}
