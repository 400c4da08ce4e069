//! Snapshots kept in process memory.

use super::{Storage, StorageError, StorageResult, VersionedSnapshot};
use std::collections::BTreeMap;
use std::sync::RwLock;

/// Keeps snapshots as serialized JSON, so a load goes through the same
/// decode and version check as a file would.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    snapshots: RwLock<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw JSON under `name`, bypassing serialization.
    pub fn insert_raw(&self, name: &str, json: impl Into<String>) -> StorageResult<()> {
        self.snapshots
            .write()
            .map_err(|_| StorageError::Poisoned)?
            .insert(name.to_string(), json.into());
        Ok(())
    }
}

impl Storage for MemoryStorage {
    fn save(&self, name: &str, snapshot: &VersionedSnapshot) -> StorageResult<()> {
        self.insert_raw(name, snapshot.to_json()?)
    }

    fn load(&self, name: &str) -> StorageResult<VersionedSnapshot> {
        let snapshots = self.snapshots.read().map_err(|_| StorageError::Poisoned)?;
        let json = snapshots
            .get(name)
            .ok_or_else(|| StorageError::NotFound(name.to_string()))?;
        VersionedSnapshot::decode(name, json)
    }

    fn delete(&self, name: &str) -> StorageResult<()> {
        self.snapshots
            .write()
            .map_err(|_| StorageError::Poisoned)?
            .remove(name);
        Ok(())
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        let snapshots = self.snapshots.read().map_err(|_| StorageError::Poisoned)?;
        Ok(snapshots.keys().cloned().collect())
    }

    fn exists(&self, name: &str) -> StorageResult<bool> {
        let snapshots = self.snapshots.read().map_err(|_| StorageError::Poisoned)?;
        Ok(snapshots.contains_key(name))
    }
}
