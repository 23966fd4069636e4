//! Top-level control flow of the interceptor.

use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

use thiserror::Error;

use crate::args;
use crate::cache::{CacheError, CacheKey, CachePaths, GitCli, MirrorCache};
use crate::config::Config;
use crate::delegate::{self, DelegateError};

/// Fatal errors of a wrapper invocation. All of them exit with status 1.
#[derive(Error, Debug)]
pub enum WrapperError {
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Delegate(#[from] DelegateError),
}

/// One invocation of the wrapper against a located real git.
pub struct Wrapper {
    git: PathBuf,
    cache: MirrorCache,
}

impl Wrapper {
    pub fn new(git: impl Into<PathBuf>, config: &Config) -> Self {
        let git = git.into();
        let cache = MirrorCache::new(CachePaths::new(&config.cache_dir), GitCli::new(&git))
            .with_lock_timeout(config.lock_timeout);
        Self { git, cache }
    }

    /// Handle `args` and return the exit code the process should end with.
    pub fn run(&self, args: &[OsString]) -> Result<i32, WrapperError> {
        let Some(source) = self.cacheable_source(args) else {
            return Ok(delegate::pass_through(&self.git, args)?);
        };

        let mirror = self.prepare_mirror(&source)?;
        let rewritten = args::insert_reference(args, &mirror);
        Ok(delegate::pass_through(&self.git, &rewritten)?)
    }

    /// The clone source when this invocation should go through the cache.
    fn cacheable_source(&self, args: &[OsString]) -> Option<OsString> {
        if !args::is_clone_invocation(args) {
            return None;
        }
        args::extract_source(args).filter(|source| !args::is_local_source(source))
    }

    /// Create or refresh the mirror for `source` and return its path.
    fn prepare_mirror(&self, source: &OsStr) -> Result<PathBuf, CacheError> {
        self.cache.ensure_root()?;

        let key = CacheKey::for_source(source);
        log::info!("Clone URL: {}", source.to_string_lossy());
        log::info!("Cache key: {}", key);

        self.cache.sync(&key, source)?;
        Ok(self.cache.mirror_path(&key))
    }
}
