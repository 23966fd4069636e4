//! Mirror lifecycle: create on miss, refresh on hit.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use super::{CacheKey, CachePaths, GitCli, GitError, MirrorLock};

/// Errors returned by cache operations.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The cache directory could not be created.
    #[error("cannot create cache directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The first mirror clone failed; the mirror must not be referenced.
    #[error("cache init failed for {}: {source}", .mirror.display())]
    MirrorInit {
        mirror: PathBuf,
        #[source]
        source: GitError,
    },
}

/// What `sync` did to the mirror.
#[derive(Debug)]
pub enum SyncOutcome {
    /// No mirror existed, a fresh one was cloned.
    Created,
    /// The existing mirror fetched all refs.
    Refreshed,
    /// The refresh failed. The mirror is stale but still usable.
    RefreshFailed(GitError),
}

/// Owns every mirror under one cache directory.
#[derive(Debug, Clone)]
pub struct MirrorCache {
    paths: CachePaths,
    git: GitCli,
    lock_timeout: Option<Duration>,
}

impl MirrorCache {
    pub fn new(paths: CachePaths, git: GitCli) -> Self {
        Self {
            paths,
            git,
            lock_timeout: None,
        }
    }

    /// Serialize create/refresh of the same mirror across processes.
    pub fn with_lock_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn paths(&self) -> &CachePaths {
        &self.paths
    }

    /// Create the cache directory if needed.
    pub fn ensure_root(&self) -> Result<(), CacheError> {
        self.paths
            .ensure_root()
            .map_err(|source| CacheError::CreateDir {
                path: self.paths.root().to_path_buf(),
                source,
            })
    }

    /// Path of the mirror for `key`.
    pub fn mirror_path(&self, key: &CacheKey) -> PathBuf {
        self.paths.mirror_dir(key)
    }

    /// Bring the mirror for `key` up to date with `source`.
    ///
    /// Any existing entry counts as a mirror, even one left half-written by an
    /// interrupted clone. A failed init is fatal; a failed refresh is not.
    pub fn sync(&self, key: &CacheKey, source: &OsStr) -> Result<SyncOutcome, CacheError> {
        let _lock = self.lock(key);
        let mirror = self.mirror_path(key);

        if !entry_exists(&mirror) {
            log::info!("Initializing cache");
            self.git
                .clone_mirror(source, &mirror)
                .map_err(|source| CacheError::MirrorInit {
                    mirror: mirror.clone(),
                    source,
                })?;
            return Ok(SyncOutcome::Created);
        }

        log::info!("Updating cache");
        match self.git.fetch_all(&mirror) {
            Ok(()) => Ok(SyncOutcome::Refreshed),
            Err(e) => {
                log::warn!("Cache update failed, using stale mirror: {}", e);
                Ok(SyncOutcome::RefreshFailed(e))
            }
        }
    }

    fn lock(&self, key: &CacheKey) -> Option<MirrorLock> {
        let timeout = self.lock_timeout?;
        match MirrorLock::acquire(&self.paths.lock_path(key), timeout) {
            Ok(lock) => Some(lock),
            Err(e) => {
                log::warn!("Proceeding without mirror lock: {}", e);
                None
            }
        }
    }
}

fn entry_exists(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok()
}
