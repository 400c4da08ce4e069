//! Snapshots as JSON files in one directory.

use super::{Storage, StorageError, StorageResult, VersionedSnapshot};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const EXTENSION: &str = "json";

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// One `<name>.json` file per snapshot.
///
/// Names are mapped to file stems by replacing anything other than ASCII
/// letters, digits, `-` and `_` with `_`, so distinct names can collide.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open (and create if needed) a snapshot directory.
    pub fn new(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(io_error(&dir))?;
        Ok(Self { dir })
    }

    /// `inkboard/snapshots` under the platform's local data directory.
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir().ok_or(StorageError::NoDataDir)?;
        Self::new(base.join("inkboard").join("snapshots"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_for(&self, name: &str) -> PathBuf {
        let stem: String = name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(stem).with_extension(EXTENSION)
    }
}

impl Storage for FileStorage {
    /// Writes beside the target and renames, so a crash never leaves a
    /// half-written snapshot under `name`.
    fn save(&self, name: &str, snapshot: &VersionedSnapshot) -> StorageResult<()> {
        let path = self.file_for(name);
        let partial = path.with_extension("json.partial");
        fs::write(&partial, snapshot.to_json()?).map_err(io_error(&partial))?;
        fs::rename(&partial, &path).map_err(io_error(&path))?;
        log::debug!("saved snapshot {name:?} to {}", path.display());
        Ok(())
    }

    fn load(&self, name: &str) -> StorageResult<VersionedSnapshot> {
        let path = self.file_for(name);
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(StorageError::NotFound(name.to_string())),
            Err(e) => return Err(io_error(&path)(e)),
        };
        let snapshot = VersionedSnapshot::decode(name, &json)?;
        log::info!(
            "loaded snapshot {name:?} (version {}, {} entities)",
            snapshot.version,
            snapshot.document.len()
        );
        Ok(snapshot)
    }

    fn delete(&self, name: &str) -> StorageResult<()> {
        let path = self.file_for(name);
        match fs::remove_file(&path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(io_error(&path)(e)),
            _ => Ok(()),
        }
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        let entries = fs::read_dir(&self.dir).map_err(io_error(&self.dir))?;
        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == EXTENSION))
            .filter_map(|path| path.file_stem()?.to_str().map(str::to_string))
            .collect();
        names.sort();
        Ok(names)
    }

    fn exists(&self, name: &str) -> StorageResult<bool> {
        Ok(self.file_for(name).is_file())
    }
}
