//! Cache directory path management
//!
//! ```text
//! ~/.git-clone-cache/
//! ├── <sha256-of-source>/        # Bare mirror (git clone --mirror)
//! ├── <sha256-of-source>.lock    # flock-based locking
//! └── git-clone-cache.log        # Event log
//! ```

use std::io;
use std::path::{Path, PathBuf};

use super::CacheKey;

/// Name of the append-only event log inside the cache directory.
pub const LOG_FILE_NAME: &str = "git-clone-cache.log";

/// Manages all filesystem paths for the cache directory layout
#[derive(Debug, Clone)]
pub struct CachePaths {
    root: PathBuf,
}

impl CachePaths {
    /// Creates a new CachePaths with the specified root directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root cache directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root directory and its parents. Idempotent.
    pub fn ensure_root(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.root)
    }

    /// Returns the mirror directory for a source: `{root}/{key}`
    pub fn mirror_dir(&self, key: &CacheKey) -> PathBuf {
        self.root.join(key.as_str())
    }

    /// Returns the lock file path: `{root}/{key}.lock`
    pub fn lock_path(&self, key: &CacheKey) -> PathBuf {
        self.root.join(format!("{}.lock", key.as_str()))
    }

    /// Returns the event log path: `{root}/git-clone-cache.log`
    pub fn log_file(&self) -> PathBuf {
        self.root.join(LOG_FILE_NAME)
    }
}
