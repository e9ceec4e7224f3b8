use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, Scope, ScopedJoinHandle};

use tracing::{debug, error};

use crate::error::{ManagerError, ReadError};
use crate::process::{ProcessReport, StatusSource};
use crate::sync::SlotPool;

pub type ReportPool = SlotPool<ProcessReport>;

/// Workers started for one run.
pub struct Dispatched<'scope> {
    pub workers: Vec<(u32, ScopedJoinHandle<'scope, ()>)>,
    /// Pids whose worker thread could not be started. These never reach the
    /// pool; the caller reports them after draining it.
    pub unspawned: Vec<ProcessReport>,
}

/// Spawns one worker per pid. Each worker reads its process and publishes
/// exactly one report into `pool`, whatever the outcome of the read.
pub fn spawn_workers<'scope, 'env>(
    scope: &'scope Scope<'scope, 'env>,
    pool: &'env ReportPool,
    source: &'env dyn StatusSource,
    pids: &[u32],
) -> Dispatched<'scope> {
    let mut workers = Vec::with_capacity(pids.len());
    let mut unspawned = Vec::new();

    for &pid in pids {
        let spawned = thread::Builder::new()
            .name(format!("psinfo-{}", pid))
            .spawn_scoped(scope, move || {
                let report = read_report(source, pid);
                pool.publish(report);
            });

        match spawned {
            Ok(handle) => {
                debug!(pid, "worker spawned");
                workers.push((pid, handle));
            }
            Err(source) => {
                error!(pid, error = %source, "failed to spawn worker");
                unspawned.push(ProcessReport::new(pid, Err(ReadError::Spawn { pid, source })));
            }
        }
    }

    Dispatched { workers, unspawned }
}

/// Reads one process, turning a panicking source into a failed report so the
/// worker still publishes.
pub fn read_report(source: &dyn StatusSource, pid: u32) -> ProcessReport {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| source.read(pid)))
        .unwrap_or_else(|_| Err(ReadError::WorkerPanicked { pid }));
    ProcessReport::new(pid, outcome)
}

/// Joins every worker. Only call once all their reports have been consumed.
pub fn join_all(workers: Vec<(u32, ScopedJoinHandle<'_, ()>)>) -> Result<(), ManagerError> {
    let mut failed = None;
    for (pid, handle) in workers {
        if handle.join().is_err() {
            error!(pid, "worker thread panicked");
            failed.get_or_insert(ManagerError::WorkerJoin { pid });
        }
    }
    match failed {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
