//! Housekeeping git operations on mirrors.
//!
//! These run the real git with both output streams discarded so that cache
//! maintenance never shows up on the caller's terminal.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use thiserror::Error;

use crate::delegate::{self, DelegateError, Streams};

/// Errors returned by git operations.
#[derive(Error, Debug)]
pub enum GitError {
    /// `git clone --mirror` exited unsuccessfully.
    #[error("mirror clone failed ({0})")]
    CloneError(ExitStatus),
    /// `git fetch --all` exited unsuccessfully.
    #[error("fetch failed ({0})")]
    FetchError(ExitStatus),
    /// git could not be started at all.
    #[error(transparent)]
    Spawn(#[from] DelegateError),
}

/// Runs the real git for cache maintenance.
#[derive(Debug, Clone)]
pub struct GitCli {
    git_path: PathBuf,
}

impl GitCli {
    /// Wrap the real git found by the locator.
    pub fn new(git_path: impl Into<PathBuf>) -> Self {
        Self {
            git_path: git_path.into(),
        }
    }

    fn run_silent(&self, args: &[&OsStr]) -> Result<ExitStatus, DelegateError> {
        delegate::run(&self.git_path, args, Streams::Discarded)
    }

    /// Create a complete bare mirror of `source` at `dest`.
    ///
    /// A partially written `dest` is left in place on failure.
    pub fn clone_mirror(&self, source: &OsStr, dest: &Path) -> Result<(), GitError> {
        let status = self.run_silent(&[
            OsStr::new("clone"),
            OsStr::new("--mirror"),
            source,
            dest.as_os_str(),
        ])?;

        if !status.success() {
            return Err(GitError::CloneError(status));
        }

        Ok(())
    }

    /// Fetch every remote ref into an existing mirror.
    pub fn fetch_all(&self, mirror: &Path) -> Result<(), GitError> {
        let status = self.run_silent(&[
            OsStr::new("-C"),
            mirror.as_os_str(),
            OsStr::new("fetch"),
            OsStr::new("--all"),
        ])?;

        if !status.success() {
            return Err(GitError::FetchError(status));
        }

        Ok(())
    }
}
