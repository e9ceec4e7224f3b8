use procfs::{
    process::{Process as ProcfsProcess, Status},
    ProcError,
};
use serde::Serialize;
use std::convert::TryFrom;

use crate::error::ReadError;

// 1. Declare submodules
pub mod source;
pub mod status;

pub use source::{ProcfsSource, StatusDir, StatusSource};
pub use status::parse_status;

// Main Record Data Structure

/// The fields psinfo reports for a single process, as found in
/// `/proc/<pid>/status`.
///
/// Memory sizes keep the kernel's text form (`"1234 kB"`); a field the
/// status source did not mention stays empty (or zero for the counters).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Record {
    pub pid: u32,
    pub name: String,
    pub state: String,
    pub vmsize: String,
    pub vmdata: String,
    pub vmexe: String,
    pub vmstk: String,
    pub voluntary_ctxt_switches: u64,
    pub nonvoluntary_ctxt_switches: u64,
}

/// What a worker publishes for its pid.
///
/// A process that cannot be read (it exited, is not visible to us, or its
/// reader panicked) is still published, with the failure in `outcome`, so
/// the other processes in the run are reported normally and the consumer
/// always receives exactly one report per worker.
#[derive(Debug)]
pub struct ProcessReport {
    pub pid: u32,
    pub outcome: Result<Record, ReadError>,
}

impl ProcessReport {
    pub fn new(pid: u32, outcome: Result<Record, ReadError>) -> Self {
        ProcessReport { pid, outcome }
    }
}

// Implementation

impl TryFrom<u32> for Record {
    type Error = ProcError;

    fn try_from(pid: u32) -> Result<Self, Self::Error> {
        let procfs_proc = ProcfsProcess::new(pid as i32)?;
        let status = procfs_proc.status()?;
        Ok(Record::from_status(pid, &status))
    }
}

impl Record {
    /// Builds a record from procfs' typed view of the status file.
    pub fn from_status(pid: u32, status: &Status) -> Self {
        Record {
            pid,
            name: status.name.clone(),
            state: status.state.clone(),
            vmsize: kb_text(status.vmsize),
            vmdata: kb_text(status.vmdata),
            vmexe: kb_text(status.vmexe),
            vmstk: kb_text(status.vmstk),
            voluntary_ctxt_switches: status.voluntary_ctxt_switches.unwrap_or(0),
            nonvoluntary_ctxt_switches: status.nonvoluntary_ctxt_switches.unwrap_or(0),
        }
    }
}

// procfs hands back kB counts; render them the way the status file does.
fn kb_text(value: Option<u64>) -> String {
    value.map(|kb| format!("{} kB", kb)).unwrap_or_default()
}
