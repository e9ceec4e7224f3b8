use std::io::{self, Write};

use serde_json::json;
use tracing::warn;

use crate::config::OutputFormat;
use crate::process::{ProcessReport, Record};
use crate::sync::Consumer;

/// Prints reports as they come out of the pool.
pub struct Reporter<'w, W: Write> {
    out: &'w mut W,
    format: OutputFormat,
    reported: usize,
    failed: usize,
}

impl<'w, W: Write> Reporter<'w, W> {
    pub fn new(out: &'w mut W, format: OutputFormat) -> Self {
        Reporter {
            out,
            format,
            reported: 0,
            failed: 0,
        }
    }

    /// Consumes exactly `count` reports from the pool, printing each as soon
    /// as it arrives.
    ///
    /// Every report is consumed even after a write fails, so no worker is
    /// left blocked on a full pool; the first write error is returned once
    /// the pool has been drained.
    pub fn drain(
        &mut self,
        consumer: &mut Consumer<'_, ProcessReport>,
        count: usize,
    ) -> io::Result<()> {
        let mut first_error = None;

        for _ in 0..count {
            let report = consumer.consume();
            if first_error.is_some() {
                continue;
            }
            if let Err(e) = self.emit(&report) {
                warn!(error = %e, "output failed, draining remaining reports");
                first_error = Some(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Prints one report.
    pub fn emit(&mut self, report: &ProcessReport) -> io::Result<()> {
        match &report.outcome {
            Ok(_) => self.reported += 1,
            Err(e) => {
                warn!(pid = report.pid, error = %e, "process could not be read");
                self.failed += 1;
            }
        }

        match self.format {
            OutputFormat::Human => write_human(&mut *self.out, report)?,
            OutputFormat::Json => write_json(&mut *self.out, report)?,
        }
        self.out.flush()
    }

    /// Reports printed successfully so far.
    pub fn reported(&self) -> usize {
        self.reported
    }

    /// Reports printed as failures so far.
    pub fn failed(&self) -> usize {
        self.failed
    }
}

pub fn write_human<W: Write>(out: &mut W, report: &ProcessReport) -> io::Result<()> {
    match &report.outcome {
        Ok(record) => write_record(out, record),
        Err(e) => {
            writeln!(out, "PID: {}", report.pid)?;
            writeln!(out, "Error: {}", e)?;
            writeln!(out)
        }
    }
}

fn write_record<W: Write>(out: &mut W, record: &Record) -> io::Result<()> {
    writeln!(out, "PID: {}", record.pid)?;
    writeln!(out, "Name: {}", record.name)?;
    writeln!(out, "State: {}", record.state)?;
    writeln!(out, "Total image size: {}", record.vmsize)?;
    writeln!(out, "TEXT region size: {}", record.vmexe)?;
    writeln!(out, "DATA region size: {}", record.vmdata)?;
    writeln!(out, "STACK region size: {}", record.vmstk)?;
    writeln!(
        out,
        "Context switches (voluntary - nonvoluntary): {}  -  {}",
        record.voluntary_ctxt_switches, record.nonvoluntary_ctxt_switches
    )?;
    writeln!(out)
}

pub fn write_json<W: Write>(out: &mut W, report: &ProcessReport) -> io::Result<()> {
    match &report.outcome {
        Ok(record) => serde_json::to_writer(&mut *out, record)?,
        Err(e) => serde_json::to_writer(
            &mut *out,
            &json!({ "pid": report.pid, "error": e.to_string() }),
        )?,
    }
    writeln!(out)
}
