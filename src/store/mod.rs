//! Snapshot persistence
//!
//! The engine itself never touches storage; it only produces and consumes
//! `SessionSnapshot` values. This module declares the persistence
//! collaborator interface and ships a file-backed implementation for the
//! hosting daemon: one minified JSON file per key under the data directory.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::engine::SessionSnapshot;

/// Keys double as filenames, so they are validated up front
static KEY_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").unwrap());

/// Persistence errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid snapshot key '{0}': 1-64 letters, digits, dashes, or underscores")]
    InvalidKey(String),

    #[error("snapshot serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Keyed snapshot persistence consumed by the hosting layer
pub trait SnapshotStore: Send + Sync {
    /// Persist a snapshot under the given key, replacing any previous one
    fn save(&self, key: &str, snapshot: &SessionSnapshot) -> Result<(), StoreError>;

    /// Load the snapshot stored under the given key, if any
    fn load(&self, key: &str) -> Result<Option<SessionSnapshot>, StoreError>;
}

/// Stores each snapshot as `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    /// Create a store rooted at the given directory
    ///
    /// The directory is created lazily on the first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory snapshots are written to
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        if !KEY_REGEX.is_match(key) {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn save(&self, key: &str, snapshot: &SessionSnapshot) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        let bytes = serde_json::to_vec(snapshot)?;
        fs::write(&path, bytes)?;
        debug!(key, path = %path.display(), "snapshot saved");
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<SessionSnapshot>, StoreError> {
        let path = self.path_for(key)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let snapshot = serde_json::from_slice(&bytes)?;
        Ok(Some(snapshot))
    }
}
