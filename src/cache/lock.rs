use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;
use thiserror::Error;

const FIRST_RETRY: Duration = Duration::from_millis(10);
const MAX_RETRY: Duration = Duration::from_millis(500);

/// Why a mirror lock could not be taken.
#[derive(Error, Debug)]
pub enum LockError {
    #[error("cannot open lock file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("lock {} still held after {:?}", .path.display(), .waited)]
    Contended { path: PathBuf, waited: Duration },
    #[error("cannot lock {}: {source}", .path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Exclusive advisory lock on one mirror. Released when dropped.
///
/// Only other wrapper processes honor it; the real tool never looks at it.
#[derive(Debug)]
pub struct MirrorLock {
    file: File,
}

impl MirrorLock {
    /// Take the lock at `lock_path`, retrying with a doubling delay until
    /// `timeout` has passed. The lock file is created if missing and never
    /// removed.
    pub fn acquire(lock_path: &Path, timeout: Duration) -> Result<Self, LockError> {
        let file = File::options()
            .append(true)
            .create(true)
            .open(lock_path)
            .map_err(|source| LockError::Open {
                path: lock_path.to_path_buf(),
                source,
            })?;

        let deadline = Instant::now() + timeout;
        let mut delay = FIRST_RETRY;
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => return Ok(Self { file }),
                Err(e) if e.kind() != io::ErrorKind::WouldBlock => {
                    return Err(LockError::Lock {
                        path: lock_path.to_path_buf(),
                        source: e,
                    });
                }
                Err(_) if Instant::now() >= deadline => {
                    return Err(LockError::Contended {
                        path: lock_path.to_path_buf(),
                        waited: timeout,
                    });
                }
                Err(_) => {
                    thread::sleep(delay.min(deadline.saturating_duration_since(Instant::now())));
                    delay = (delay * 2).min(MAX_RETRY);
                }
            }
        }
    }
}

impl Drop for MirrorLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}
