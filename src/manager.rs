use std::io::Write;
use std::thread;

use tracing::debug;

use crate::config::Config;
use crate::error::ManagerError;
use crate::process::StatusSource;
use crate::sync::PoolStats;

pub mod dispatch;
pub mod report;

use dispatch::ReportPool;
use report::Reporter;

/// Outcome of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub reported: usize,
    pub failed: usize,
    pub stats: PoolStats,
}

//Manager struct declaration
pub struct Manager {
    config: Config,
    source: Box<dyn StatusSource>,
}

impl Manager {
    pub fn new(config: Config) -> Result<Self, ManagerError> { //Constructor
        config.validate()?;
        let source = config.status_source();
        Ok(Manager { config, source })
    }

    /// Uses `source` instead of the one `config` would select.
    pub fn with_source(config: Config, source: Box<dyn StatusSource>) -> Self {
        Manager { config, source }
    }

    /// Reports every pid in `pids` to `out`.
    ///
    /// One worker thread per pid reads its process and publishes into a
    /// shared pool of `min(capacity, pids.len())` slots; this thread prints
    /// each report as it is consumed. Processes that cannot be read are
    /// reported as failures without stopping the others.
    pub fn run<W: Write>(&self, pids: &[u32], out: &mut W) -> Result<RunSummary, ManagerError> {
        if pids.is_empty() {
            return Err(ManagerError::NoPids);
        }

        let pool = ReportPool::new(self.config.pool_capacity(pids.len()))?;
        let mut consumer = pool.consumer()?;
        let mut reporter = Reporter::new(out, self.config.format);
        let source: &dyn StatusSource = self.source.as_ref();

        thread::scope(|scope| -> Result<(), ManagerError> {
            let dispatched = dispatch::spawn_workers(scope, &pool, source, pids);
            let drained = reporter.drain(&mut consumer, dispatched.workers.len());
            let emitted = dispatched
                .unspawned
                .iter()
                .try_for_each(|report| reporter.emit(report));
            dispatch::join_all(dispatched.workers)?;
            drained?;
            emitted?;
            Ok(())
        })?;

        let summary = RunSummary {
            reported: reporter.reported(),
            failed: reporter.failed(),
            stats: pool.stats(),
        };
        debug!(?summary, "run complete");
        Ok(summary)
    }
}
