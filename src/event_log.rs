//! Timestamped progress lines on stderr, mirrored into the cache's log file.
//!
//! This is an `env_logger` backend: every `log::info!`/`warn!`/`error!` in the
//! crate is rendered as `[YYYY-MM-DD HH:MM:SS] [git-clone-cache] <message>` and
//! written to stderr. When a log file is attached the same line is appended to
//! it. Failing to write the file is ignored.

use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

use chrono::{DateTime, Local};
use log::Level;

use crate::config::LOG_ENV;

/// Tag between the timestamp and the message.
pub const TAG: &str = "git-clone-cache";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render one log line, without the trailing newline.
pub fn format_line(now: &DateTime<Local>, level: Level, message: impl fmt::Display) -> String {
    let prefix = match level {
        Level::Error => "ERROR: ",
        Level::Warn => "WARNING: ",
        _ => "",
    };
    format!(
        "[{}] [{}] {}{}",
        now.format(TIMESTAMP_FORMAT),
        TAG,
        prefix,
        message
    )
}

/// Writes everything to stderr and, best effort, to an append-only file.
pub struct TeeWriter {
    file: Option<PathBuf>,
}

impl TeeWriter {
    pub fn new(file: Option<PathBuf>) -> Self {
        Self { file }
    }

    fn append_to_file(&self, buf: &[u8]) {
        let Some(path) = &self.file else {
            return;
        };
        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
            let _ = file.write_all(buf);
        }
    }
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.append_to_file(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

/// Install the event log as the global logger.
///
/// `log_file` is `None` when nothing may be written to disk. Only the first
/// call in a process has any effect.
pub fn init(log_file: Option<PathBuf>) {
    let env = env_logger::Env::default().filter_or(LOG_ENV, "info");
    let _ = env_logger::Builder::from_env(env)
        .format(|buf, record| {
            writeln!(
                buf,
                "{}",
                format_line(&Local::now(), record.level(), record.args())
            )
        })
        .target(env_logger::Target::Pipe(Box::new(TeeWriter::new(log_file))))
        .try_init();
}
