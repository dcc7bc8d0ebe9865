//! Diagnostic output for the CLI
//!
//! `TerminalEmitter` prints pipeline diagnostics to stderr as
//! `severity: message` lines and keeps per-severity counts.
//!
//! ## Exit Codes
//!
//! | Exit Code | Meaning |
//! |-----------|---------|
//! | 0 | Success: workbook written |
//! | 1 | Failure: unreadable input, invalid workbook, write error |
//! | 2 | Usage: no output path could be resolved |

use std::io::Write;
use std::process;

use ptdgen_core::{Diagnostic, DiagnosticEmitter, Severity};

/// Exit codes for CLI operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    Failure = 1,
    Usage = 2,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl From<ExitCode> for process::ExitCode {
    fn from(code: ExitCode) -> Self {
        process::ExitCode::from(code as u8)
    }
}

/// Writes diagnostics to a terminal stream
pub struct TerminalEmitter<W: Write> {
    writer: W,
    /// Lowest severity printed
    threshold: Severity,
    warning_count: usize,
}

impl<W: Write> TerminalEmitter<W> {
    pub fn new(writer: W, threshold: Severity) -> Self {
        Self {
            writer,
            threshold,
            warning_count: 0,
        }
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    /// Print a one-line summary when warnings were reported
    pub fn finish(&mut self) {
        if self.warning_count > 0 {
            let _ = writeln!(
                self.writer,
                "{} warning{} reported; the workbook may have gaps",
                self.warning_count,
                if self.warning_count == 1 { "" } else { "s" }
            );
        }
    }
}

impl TerminalEmitter<std::io::Stderr> {
    pub fn stderr(threshold: Severity) -> Self {
        Self::new(std::io::stderr(), threshold)
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<W> {
    fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity == Severity::Warning {
            self.warning_count += 1;
        }
        if diagnostic.severity < self.threshold {
            return;
        }
        // A closed stderr must not abort the run
        let _ = writeln!(
            self.writer,
            "{}: {}",
            diagnostic.severity.as_str(),
            diagnostic.message
        );
    }
}
