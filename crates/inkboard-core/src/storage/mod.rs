//! Named, versioned snapshots of the canvas model.
//!
//! A snapshot is the flat JSON object `{version, timestamp, paths, shapes}`.
//! Stores hand back snapshots only after their version has been checked, so
//! callers never see a document written by a newer format.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

use crate::document::CanvasDocument;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Newest snapshot format this build reads and the one it writes.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("no snapshot named {0:?}")]
    NotFound(String),
    #[error("snapshot {name:?} has format version {found}, newest readable is {}", SNAPSHOT_VERSION)]
    UnsupportedVersion { name: String, found: u32 },
    #[error("snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no data directory on this platform")]
    NoDataDir,
    #[error("snapshot store lock poisoned")]
    Poisoned,
}

pub type StorageResult<T> = Result<T, StorageError>;

/// A document snapshot with format version and save time.
///
/// A bare `{paths, shapes}` object also parses, as version 1 saved at time 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionedSnapshot {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Unix time in milliseconds.
    #[serde(default)]
    pub timestamp: u64,
    #[serde(flatten)]
    pub document: CanvasDocument,
}

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

impl VersionedSnapshot {
    /// Wrap `document` in the current format, stamped with the current time.
    pub fn new(document: CanvasDocument) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self {
            version: SNAPSHOT_VERSION,
            timestamp,
            document,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse without checking the version.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Parse the snapshot stored under `name` and check its version.
    pub fn decode(name: &str, json: &str) -> StorageResult<Self> {
        let snapshot = Self::from_json(json)?;
        snapshot.check_version(name)?;
        Ok(snapshot)
    }

    /// Reject versions this build cannot read.
    pub fn check_version(&self, name: &str) -> StorageResult<()> {
        if (1..=SNAPSHOT_VERSION).contains(&self.version) {
            Ok(())
        } else {
            Err(StorageError::UnsupportedVersion {
                name: name.to_string(),
                found: self.version,
            })
        }
    }

    pub fn into_document(self) -> CanvasDocument {
        self.document
    }
}

/// A place to keep snapshots by name.
///
/// Calls are synchronous; the engine runs on a single event loop and a save
/// is one small JSON write.
pub trait Storage {
    /// Save `snapshot` under `name`, replacing any previous one.
    fn save(&self, name: &str, snapshot: &VersionedSnapshot) -> StorageResult<()>;

    /// Load and version-check the snapshot saved under `name`.
    fn load(&self, name: &str) -> StorageResult<VersionedSnapshot>;

    /// Delete a snapshot. Deleting a missing name is not an error.
    fn delete(&self, name: &str) -> StorageResult<()>;

    /// Saved names in ascending order.
    fn list(&self) -> StorageResult<Vec<String>>;

    fn exists(&self, name: &str) -> StorageResult<bool> {
        Ok(self.list()?.iter().any(|saved| saved == name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Shape;

    #[test]
    fn test_versioned_round_trip() {
        let mut doc = CanvasDocument::new();
        doc.add_shape(Shape::rectangle(1.0, 2.0, 3.0, 4.0));
        let snapshot = VersionedSnapshot::new(doc.clone());
        assert_eq!(snapshot.version, SNAPSHOT_VERSION);
        assert!(snapshot.timestamp > 0);

        let json = snapshot.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.get("paths").is_some());
        assert!(value.get("version").is_some());

        let loaded = VersionedSnapshot::decode("doc", &json).unwrap();
        assert_eq!(loaded, snapshot);
        assert_eq!(loaded.into_document(), doc);
    }

    #[test]
    fn test_bare_snapshot_parses() {
        let loaded = VersionedSnapshot::decode("bare", r#"{"paths": [], "shapes": []}"#).unwrap();
        assert_eq!(loaded.version, SNAPSHOT_VERSION);
        assert_eq!(loaded.timestamp, 0);
        assert!(loaded.document.is_empty());
    }

    #[test]
    fn test_unsupported_versions_rejected() {
        for version in [0, SNAPSHOT_VERSION + 1] {
            let json = format!(r#"{{"version": {version}, "paths": [], "shapes": []}}"#);
            let err = VersionedSnapshot::decode("future", &json).unwrap_err();
            assert!(matches!(
                err,
                StorageError::UnsupportedVersion { ref name, found } if name == "future" && found == version
            ));
        }
        assert!(matches!(
            VersionedSnapshot::decode("junk", "[1, 2]"),
            Err(StorageError::Json(_))
        ));
    }
}
