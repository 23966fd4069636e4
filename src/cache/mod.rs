//! Mirror cache: keys, layout, locking and the create-or-refresh lifecycle.

mod git;
mod key;
mod lock;
mod mirror;
mod paths;

pub use git::{GitCli, GitError};
pub use key::CacheKey;
pub use lock::{LockError, MirrorLock};
pub use mirror::{CacheError, MirrorCache, SyncOutcome};
pub use paths::CachePaths;
