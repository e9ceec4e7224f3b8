//! Parser for the text of `/proc/<pid>/status`.
//!
//! Each line is `Key:<whitespace>value` (some kernels and fixtures use a tab
//! instead of the colon). Only the keys that make up a [`Record`] are kept;
//! everything else is ignored. A line that cannot be split, or a counter that
//! is not a number, is skipped and the field keeps its default.

use tracing::trace;

use super::Record;

/// Parses status text into a record for `pid`.
pub fn parse_status(pid: u32, text: &str) -> Record {
    let mut record = Record {
        pid,
        ..Record::default()
    };

    for line in text.lines() {
        let Some((key, value)) = split_line(line) else {
            if !line.trim().is_empty() {
                trace!(pid, line, "skipping status line without a separator");
            }
            continue;
        };
        trace!(pid, key, value, "status field");

        match key {
            "Name" => record.name = value.to_string(),
            "State" => record.state = value.to_string(),
            "VmSize" => record.vmsize = value.to_string(),
            "VmData" => record.vmdata = value.to_string(),
            "VmExe" => record.vmexe = value.to_string(),
            "VmStk" => record.vmstk = value.to_string(),
            "voluntary_ctxt_switches" => {
                if let Some(n) = parse_count(pid, key, value) {
                    record.voluntary_ctxt_switches = n;
                }
            }
            "nonvoluntary_ctxt_switches" => {
                if let Some(n) = parse_count(pid, key, value) {
                    record.nonvoluntary_ctxt_switches = n;
                }
            }
            _ => {}
        }
    }

    record
}

fn split_line(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once([':', '\t'])?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, value.trim()))
}

fn parse_count(pid: u32, key: &str, value: &str) -> Option<u64> {
    match value.parse() {
        Ok(n) => Some(n),
        Err(_) => {
            trace!(pid, key, value, "ignoring non-numeric counter");
            None
        }
    }
}
