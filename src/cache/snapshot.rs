//! On-disk store for the bulk player snapshot
//!
//! The bulk player dataset is large and changes slowly, so it is fetched once
//! and kept as a JSON file that survives restarts. The file is written
//! verbatim as received from upstream; parsing happens afterwards.

use directories::ProjectDirs;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File name used for the persisted snapshot
pub const SNAPSHOT_FILE_NAME: &str = "players_nfl.json";

/// Reads and writes the persisted player snapshot
///
/// By default the snapshot lives in an XDG-compliant cache directory
/// (`~/.cache/sleeperboard/` on Linux).
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    /// Full path of the snapshot file
    path: PathBuf,
}

impl SnapshotStore {
    /// Creates a SnapshotStore in the XDG cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "sleeperboard")?;
        let path = project_dirs.cache_dir().join(SNAPSHOT_FILE_NAME);
        Some(Self { path })
    }

    /// Creates a SnapshotStore backed by an explicit file path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the snapshot file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a persisted snapshot is present
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Reads the persisted snapshot
    ///
    /// # Returns
    /// * `Ok(Some(text))` if the file exists
    /// * `Ok(None)` if there is no persisted snapshot yet
    /// * `Err` for any other IO failure
    pub fn read(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Persists the snapshot body exactly as given
    ///
    /// Writes to a sibling temp file first and renames it into place, so a
    /// crash mid-write never leaves a truncated snapshot behind.
    pub fn write(&self, body: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body)?;
        fs::rename(&tmp, &self.path)
    }
}
