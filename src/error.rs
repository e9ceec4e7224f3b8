//! Error types for psinfo.

use std::collections::TryReserveError;
use std::io;

use thiserror::Error;

/// Why a single process could not be reported.
///
/// These never abort a run: each one travels through the slot pool inside a
/// [`ProcessReport`](crate::process::ProcessReport) and is printed in place of
/// that process's block.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("process {pid} not found (exited or never existed)")]
    NotFound { pid: u32 },

    #[error("permission denied reading status of process {pid}")]
    PermissionDenied { pid: u32 },

    #[error("I/O error reading status of process {pid}: {source}")]
    Io {
        pid: u32,
        #[source]
        source: io::Error,
    },

    #[error("procfs error for process {pid}: {message}")]
    Procfs { pid: u32, message: String },

    #[error("worker for process {pid} panicked while reading its status")]
    WorkerPanicked { pid: u32 },

    #[error("could not spawn worker for process {pid}: {source}")]
    Spawn {
        pid: u32,
        #[source]
        source: io::Error,
    },
}

impl ReadError {
    pub fn pid(&self) -> u32 {
        match self {
            ReadError::NotFound { pid }
            | ReadError::PermissionDenied { pid }
            | ReadError::Io { pid, .. }
            | ReadError::Procfs { pid, .. }
            | ReadError::WorkerPanicked { pid }
            | ReadError::Spawn { pid, .. } => *pid,
        }
    }

    /// Maps an I/O error from opening or reading a status file.
    pub fn from_io(pid: u32, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => ReadError::NotFound { pid },
            io::ErrorKind::PermissionDenied => ReadError::PermissionDenied { pid },
            _ => ReadError::Io { pid, source },
        }
    }

    pub fn from_procfs(pid: u32, err: procfs::ProcError) -> Self {
        match err {
            procfs::ProcError::NotFound(_) => ReadError::NotFound { pid },
            procfs::ProcError::PermissionDenied(_) => ReadError::PermissionDenied { pid },
            procfs::ProcError::Io(source, _) => ReadError::from_io(pid, source),
            other => ReadError::Procfs {
                pid,
                message: other.to_string(),
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("slot pool capacity must be at least 1")]
    ZeroCapacity,

    #[error("could not allocate a slot pool of {capacity} slots: {source}")]
    Allocation {
        capacity: usize,
        #[source]
        source: TryReserveError,
    },

    #[error("the slot pool consumer has already been claimed")]
    ConsumerClaimed,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("capacity must be at least 1 (got {0})")]
    InvalidCapacity(usize),

    #[error("proc root {0} is not a directory")]
    ProcRootMissing(String),
}

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("no process ids supplied")]
    NoPids,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error("failed to write report: {0}")]
    Output(#[from] io::Error),

    #[error("worker thread for process {pid} could not be joined")]
    WorkerJoin { pid: u32 },
}
