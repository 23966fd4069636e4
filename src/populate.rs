//! Pre-seeding the cache from existing checkouts or remote URLs.
//!
//! A local checkout is keyed by its `origin` URL but mirrored from the local
//! path, so a later `git clone <origin>` through the wrapper finds a warm
//! mirror without having downloaded anything.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::cache::{CacheError, CacheKey, GitError, MirrorCache, SyncOutcome};
use crate::locate::{self, LocateError};

/// Directories never descended into while searching for checkouts.
const SKIPPED_DIRS: [&str; 2] = [".git", "node_modules"];

/// Errors for a single populate target.
#[derive(Error, Debug)]
pub enum PopulateError {
    #[error("not a git repo: {}", .0.display())]
    NotARepo(PathBuf),
    #[error("cannot read repository: {0}")]
    Repository(#[from] git2::Error),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error("failed to update cache for {url}: {source}")]
    Refresh {
        url: String,
        #[source]
        source: GitError,
    },
}

/// Something to put in the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A remote URL, keyed and cloned verbatim.
    Remote(OsString),
    /// A local checkout, keyed by `origin` and cloned from `path`.
    Checkout { path: PathBuf, origin: String },
}

impl Target {
    /// Cache key input: the URL a later `git clone` would be given.
    pub fn url(&self) -> String {
        match self {
            Self::Remote(url) => url.to_string_lossy().into_owned(),
            Self::Checkout { origin, .. } => origin.clone(),
        }
    }

    fn key(&self) -> CacheKey {
        match self {
            Self::Remote(url) => CacheKey::for_source(url),
            Self::Checkout { origin, .. } => CacheKey::for_source(origin),
        }
    }

    fn clone_source(&self) -> &OsStr {
        match self {
            Self::Remote(url) => url,
            Self::Checkout { path, .. } => path.as_os_str(),
        }
    }
}

/// Decide what a command-line argument refers to.
///
/// A checkout without an `origin` remote has nothing to key it by and yields
/// `None`; the caller skips it.
pub fn classify(arg: &OsStr) -> Result<Option<Target>, PopulateError> {
    let path = Path::new(arg);

    if is_checkout(path) {
        let target = origin_url(path)?.map(|origin| Target::Checkout {
            path: path.to_path_buf(),
            origin,
        });
        return Ok(target);
    }

    if path.is_dir() {
        return Err(PopulateError::NotARepo(path.to_path_buf()));
    }

    Ok(Some(Target::Remote(arg.to_os_string())))
}

fn is_checkout(path: &Path) -> bool {
    path.is_dir() && path.join(".git").exists()
}

/// URL of the `origin` remote, if the repository has one.
fn origin_url(path: &Path) -> Result<Option<String>, git2::Error> {
    let repo = git2::Repository::open(path)?;
    let remote = match repo.find_remote("origin") {
        Ok(remote) => remote,
        Err(e) if e.code() == git2::ErrorCode::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    Ok(remote.url().map(str::to_string))
}

/// Every directory under `root` (inclusive) that holds a `.git` entry.
///
/// Symlinks are not followed. Unreadable directories are skipped.
pub fn find_checkouts(root: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::debug!("skipping {}: {}", dir.display(), e);
                continue;
            }
        };

        for entry in entries.flatten() {
            let name = entry.file_name();
            if name == ".git" {
                found.push(dir.clone());
            }

            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_dir() && !SKIPPED_DIRS.iter().any(|skip| name == *skip) {
                pending.push(entry.path());
            }
        }
    }

    found.sort();
    found
}

/// Locate the real git for the populate tool.
///
/// Besides itself, the tool skips a `git` sitting next to it, which is where
/// the wrapper is normally installed.
pub fn locate_git(explicit: Option<PathBuf>) -> Result<PathBuf, LocateError> {
    if let Some(git) = explicit {
        return Ok(git);
    }

    let own = std::env::current_exe().map_err(LocateError::CurrentExe)?;
    let search_path = std::env::var_os("PATH").unwrap_or_default();
    locate::find_real_git(&populate_exclusions(&own), &search_path)
}

/// Paths the populate tool must not pick as the real git: its own binary
/// and the `git` installed beside it.
pub fn populate_exclusions(own: &Path) -> Vec<PathBuf> {
    let mut excluded = vec![own.to_path_buf()];
    if let Some(dir) = own.parent() {
        excluded.push(dir.join(locate::git_executable_name()));
    }
    excluded
}

/// Fills the cache one target at a time.
pub struct Populator {
    cache: MirrorCache,
}

impl Populator {
    pub fn new(cache: MirrorCache) -> Self {
        Self { cache }
    }

    /// Create or refresh the mirror for `target` and return its path.
    ///
    /// Unlike the wrapper, a failed refresh counts as a failure here.
    pub fn populate(&self, target: &Target) -> Result<PathBuf, PopulateError> {
        self.cache.ensure_root()?;

        let url = target.url();
        let key = target.key();
        let mirror = self.cache.mirror_path(&key);

        match self.cache.sync(&key, target.clone_source())? {
            SyncOutcome::Created => {
                println!("Cached: {}", url);
                println!("  -> {}", mirror.display());
            }
            SyncOutcome::Refreshed => println!("Updated: {}", url),
            SyncOutcome::RefreshFailed(source) => {
                return Err(PopulateError::Refresh { url, source });
            }
        }

        Ok(mirror)
    }
}
