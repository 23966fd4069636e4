//! Environment-driven configuration.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

/// Overrides the cache directory.
pub const CACHE_DIR_ENV: &str = "GIT_CLONE_CACHE_DIR";
/// env_logger filter for the event log.
pub const LOG_ENV: &str = "GIT_CLONE_CACHE_LOG";
/// Seconds to wait for a mirror lock. `0` disables locking.
pub const LOCK_TIMEOUT_ENV: &str = "GIT_CLONE_CACHE_LOCK_TIMEOUT";

const DEFAULT_DIR_NAME: &str = ".git-clone-cache";
const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Process-wide settings resolved once at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding every mirror plus the log file.
    pub cache_dir: PathBuf,
    /// How long to wait for a per-mirror lock, `None` when locking is off.
    pub lock_timeout: Option<Duration>,
}

impl Config {
    /// Resolve configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var_os(name))
    }

    /// Resolve configuration using `lookup` in place of the environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<OsString>) -> Self {
        let cache_dir = lookup(CACHE_DIR_ENV)
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_cache_dir);

        let lock_timeout = match lookup(LOCK_TIMEOUT_ENV)
            .and_then(|raw| raw.into_string().ok())
            .and_then(|raw| raw.trim().parse::<u64>().ok())
        {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => Some(DEFAULT_LOCK_TIMEOUT),
        };

        Self {
            cache_dir,
            lock_timeout,
        }
    }
}

/// `~/.git-clone-cache`, or a relative `.git-clone-cache` when there is no home.
fn default_cache_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(DEFAULT_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DIR_NAME))
}
