// src/error.rs
use thiserror::Error;

/// Per-source failures that end in the sentinel report instead of aborting the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("malformed JSON payload: {0}")]
    MalformedJson(String),
    #[error("record not found: {0}")]
    MissingRecord(String),
    #[error("field `{0}` missing from record")]
    MissingField(String),
    #[error("table cell has {found} line(s), expected 3")]
    MalformedTable { found: usize },
    #[error("source task aborted: {0}")]
    Aborted(String),
}
