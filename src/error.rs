//! Error types.
//!
//! Two classes of failure exist. [`RiskError`] is fatal: it propagates to the
//! caller and aborts the run. [`ParseError`] and [`RowError`] are recoverable:
//! they are handled where they are detected, logged, and replaced by a default
//! value or a dropped row.
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, RiskError>;

/// Fatal errors. Any of these aborts the current run.
#[derive(Debug, Error)]
pub enum RiskError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("malformed JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no usable rows in {0}")]
    EmptyDataset(String),
    #[error("shape mismatch: {what} has length {got}, expected {expected}")]
    InvalidShape {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    #[error("unexpected layout in {}: {reason}", path.display())]
    Format { path: PathBuf, reason: String },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl RiskError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// A single cell that could not be read as a number.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("column {column}: cannot parse {value:?} as a number ({reason})")]
pub struct ParseError {
    pub column: String,
    pub value: String,
    pub reason: String,
}

/// A raw row that could not be turned into a feature vector at all.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("row {row}: {reason}")]
pub struct RowError {
    pub row: usize,
    pub reason: String,
}
