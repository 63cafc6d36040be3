//! Shared output formatting for lint results.

use anyhow::Result;
use std::io::Write;
use yaml5_core::TargetReport;

use crate::OutputFormat;

/// Writes reports as they arrive.
///
/// Text output is written per target immediately. JSON output is a single
/// array, written by [`Printer::finish`].
pub struct Printer<W: Write> {
    format: OutputFormat,
    out: W,
    pending: Vec<TargetReport>,
}

impl<W: Write> Printer<W> {
    /// Creates a printer writing to `out`.
    pub fn new(format: OutputFormat, out: W) -> Self {
        Self {
            format,
            out,
            pending: Vec::new(),
        }
    }

    /// Handles the report of one target.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn report(&mut self, report: &TargetReport) -> Result<()> {
        match self.format {
            OutputFormat::Text => write!(self.out, "{report}")?,
            OutputFormat::Json => self.pending.push(report.clone()),
        }
        Ok(())
    }

    /// Writes whatever is still buffered.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn finish(mut self) -> Result<W> {
        if self.format == OutputFormat::Json {
            let json = serde_json::to_string_pretty(&self.pending)?;
            writeln!(self.out, "{json}")?;
        }
        self.out.flush()?;
        Ok(self.out)
    }
}
