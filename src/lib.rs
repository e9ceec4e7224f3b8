//! psinfo: report `/proc/<pid>/status` details for a list of processes.
//!
//! One worker thread per process reads its status and publishes the result
//! into a [`SlotPool`](sync::SlotPool) with fewer slots than there are
//! workers; the calling thread prints each report as soon as it is consumed.

pub mod config;
pub mod error;
pub mod manager;
pub mod process;
pub mod sync;

pub use config::{Config, OutputFormat, DEFAULT_CAPACITY};
pub use error::{ConfigError, ManagerError, PoolError, ReadError};
pub use manager::{Manager, RunSummary};
pub use process::{ProcessReport, Record};
