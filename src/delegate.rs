//! Runs the real tool and relays its exit status.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use thiserror::Error;

/// Exit status used for every failure that is not the child's own.
pub const FAILURE_EXIT_CODE: i32 = 1;

/// How the child's standard streams are wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Streams {
    /// Inherit stdin, stdout and stderr from the wrapper.
    Connected,
    /// Null stdin, discard stdout and stderr. Used for housekeeping.
    Discarded,
}

/// The child could not be started.
#[derive(Error, Debug)]
#[error("failed to run {}: {source}", .program.display())]
pub struct DelegateError {
    pub program: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Run `program` with `args` and wait for it to exit.
pub fn run<I, S>(program: &Path, args: I, streams: Streams) -> Result<ExitStatus, DelegateError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(program);
    cmd.args(args);

    if streams == Streams::Discarded {
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::null());
        cmd.stderr(Stdio::null());
    }

    cmd.status().map_err(|source| DelegateError {
        program: program.to_path_buf(),
        source,
    })
}

/// Exit code the wrapper should finish with after the child exited.
///
/// Normal exits are relayed verbatim. A child killed by a signal has no code
/// and maps to [`FAILURE_EXIT_CODE`].
pub fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(FAILURE_EXIT_CODE)
}

/// Run with connected streams and return the code to exit with.
pub fn pass_through<S: AsRef<OsStr>>(program: &Path, args: &[S]) -> Result<i32, DelegateError> {
    run(program, args, Streams::Connected).map(exit_code)
}
