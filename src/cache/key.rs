use std::ffi::OsStr;
use std::fmt;

use sha2::{Digest, Sha256};

/// Lowercase hex sha256 of a clone source, used as the mirror directory name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Digest the source exactly as it was passed on the command line.
    pub fn for_source(source: impl AsRef<OsStr>) -> Self {
        let digest = Sha256::digest(source.as_ref().as_encoded_bytes());
        Self(hex::encode(digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
