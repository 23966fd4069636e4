//! Finds the real `git` on the search path while skipping the wrapper itself.
//!
//! The wrapper is normally installed under the name `git` in a directory that
//! comes before the real tool on `PATH`. A naive lookup would find the wrapper
//! again and recurse forever, so every candidate is canonicalized and compared
//! against the excluded paths before it is accepted.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors returned while locating the real tool.
#[derive(Error, Debug)]
pub enum LocateError {
    /// No acceptable candidate exists on the search path.
    #[error("{0} not found in PATH")]
    NotFound(String),
    /// The wrapper's own executable path could not be determined.
    #[error("cannot resolve own executable: {0}")]
    CurrentExe(#[source] std::io::Error),
}

/// Executable name of the wrapped tool on this platform.
pub fn git_executable_name() -> String {
    format!("git{}", std::env::consts::EXE_SUFFIX)
}

/// Search `search_path` in order for `git`, skipping any candidate that
/// resolves to one of `excluded`.
///
/// The first candidate that exists and is a regular file wins. The returned
/// path is the candidate as found on the search path, not its canonical form.
pub fn find_real_git(excluded: &[PathBuf], search_path: &OsStr) -> Result<PathBuf, LocateError> {
    let name = git_executable_name();
    let excluded: Vec<PathBuf> = excluded.iter().map(|p| resolve(p)).collect();

    for dir in std::env::split_paths(search_path) {
        let candidate = dir.join(&name);

        if excluded.contains(&resolve(&candidate)) {
            continue;
        }

        match std::fs::metadata(&candidate) {
            Ok(meta) if meta.is_file() => return Ok(candidate),
            _ => continue,
        }
    }

    Err(LocateError::NotFound(name))
}

/// Locate the real git for the running wrapper using the process environment.
pub fn find_real_git_from_env() -> Result<PathBuf, LocateError> {
    let own = std::env::current_exe().map_err(LocateError::CurrentExe)?;
    let search_path = std::env::var_os("PATH").unwrap_or_default();
    find_real_git(&[own], &search_path)
}

/// Canonical form when the path exists, otherwise an absolute form.
fn resolve(path: &Path) -> PathBuf {
    std::fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
