use std::fs;
use std::io;
use std::path::PathBuf;

use tracing::debug;

use super::{parse_status, Record};
use crate::error::ReadError;

/// Where the kernel exposes process status text.
pub const PROC_ROOT: &str = "/proc";

/// Somewhere process status can be read from.
///
/// Implementations are called concurrently from every worker thread and must
/// not share mutable state between calls.
pub trait StatusSource: Send + Sync {
    fn read(&self, pid: u32) -> Result<Record, ReadError>;
}

/// Reads the live system through procfs.
///
/// procfs refuses status text that is not UTF-8 (any process can rename
/// itself to arbitrary bytes); those processes are re-read as text from
/// `/proc` so the rest of their fields are still reported.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcfsSource;

impl StatusSource for ProcfsSource {
    fn read(&self, pid: u32) -> Result<Record, ReadError> {
        debug!(pid, "reading status via procfs");
        Record::try_from(pid)
            .map_err(|e| ReadError::from_procfs(pid, e))
            .or_else(|e| retry_as_text(e, &StatusDir::new(PROC_ROOT)))
    }
}

fn retry_as_text(err: ReadError, text: &StatusDir) -> Result<Record, ReadError> {
    match err {
        ReadError::Io { pid, ref source } if source.kind() == io::ErrorKind::InvalidData => {
            debug!(pid, "status is not UTF-8, reading it as text");
            text.read(pid)
        }
        other => Err(other),
    }
}

/// Reads `<root>/<pid>/status` as text and parses it.
///
/// Pointed at `/proc` this is equivalent to [`ProcfsSource`]; pointed at a
/// directory of captured status files it replays them. Bytes that are not
/// UTF-8 are replaced rather than rejected.
#[derive(Debug, Clone)]
pub struct StatusDir {
    root: PathBuf,
}

impl StatusDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        StatusDir { root: root.into() }
    }

    pub fn status_path(&self, pid: u32) -> PathBuf {
        self.root.join(pid.to_string()).join("status")
    }
}

impl StatusSource for StatusDir {
    fn read(&self, pid: u32) -> Result<Record, ReadError> {
        let path = self.status_path(pid);
        debug!(pid, path = %path.display(), "reading status file");
        let bytes = fs::read(&path).map_err(|e| ReadError::from_io(pid, e))?;
        Ok(parse_status(pid, &String::from_utf8_lossy(&bytes)))
    }
}
