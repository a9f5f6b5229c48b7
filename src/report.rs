// src/report.rs
//! Per-source report and its printable form.

use std::fmt::{self, Display, Write as _};

use crate::error::SourceError;
use crate::source::SourceId;

/// Printed in place of a report whenever a source cannot be read.
pub const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";

/// `"<source>:\n"` followed by each line and a newline.
pub fn format_report(source: impl Display, lines: &[String]) -> String {
    let mut out = format!("{source}:\n");
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    pub source: SourceId,
    pub outcome: Result<Vec<String>, SourceError>,
}

impl SourceReport {
    pub fn ok(source: SourceId, lines: Vec<String>) -> Self {
        Self {
            source,
            outcome: Ok(lines),
        }
    }

    pub fn failed(source: SourceId, err: SourceError) -> Self {
        Self {
            source,
            outcome: Err(err),
        }
    }

    pub fn lines(&self) -> &[String] {
        self.outcome.as_deref().unwrap_or_default()
    }

    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self.outcome,
            Err(SourceError::Transport(_)) | Err(SourceError::Aborted(_))
        )
    }

    pub fn render(&self) -> String {
        match &self.outcome {
            Ok(lines) => format_report(self.source, lines),
            Err(_) => INTERNAL_SERVER_ERROR.to_string(),
        }
    }
}

impl Display for SourceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Reports joined the way the binary prints them (blank line after each).
pub fn render_all(reports: &[SourceReport]) -> String {
    let mut out = String::new();
    for r in reports {
        let _ = writeln!(out, "{}", r.render());
    }
    out
}

/// Whether the run should exit non-zero: some source could not be fetched at all.
/// Data errors (bad JSON, missing record) still count as a normal run.
pub fn exit_failed(reports: &[SourceReport]) -> bool {
    reports.iter().any(SourceReport::is_transport_failure)
}
