//! Error types for the county summary pipeline.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors raised by the loader, normalizer, joiner and sink.
///
/// The orchestrator decides which of these are recoverable: any of them on a
/// secondary source only drops that source, on the base source they abort
/// the run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A configured input could not be opened or read.
    #[error("source '{source_name}' unavailable ({path}): {reason}")]
    SourceUnavailable {
        source_name: String,
        path: PathBuf,
        reason: String,
    },

    /// A table has no key column, so it cannot be aggregated.
    #[error("table '{table}' has no key column '{column}'")]
    MissingKeyColumn { table: String, column: String },

    /// A table has no key column, so it cannot be joined.
    #[error("cannot join table '{table}': key column '{column}' missing")]
    KeyColumnMissing { table: String, column: String },

    /// A column named by the caller does not exist.
    #[error("column '{column}' not found in table '{table}'")]
    ColumnNotFound { table: String, column: String },

    /// Mean aggregation hit a column holding text.
    #[error("column '{column}' in table '{table}' is not numeric and cannot be averaged")]
    NonNumericAggregation { table: String, column: String },

    /// Two joined tables share a non-key column name that could not be resolved.
    #[error("column '{column}' from '{right}' collides with an existing column of '{left}'")]
    ColumnCollision {
        column: String,
        left: String,
        right: String,
    },

    /// A table joined onto the base holds the same key twice.
    #[error("table '{table}' holds key '{key}' more than once")]
    DuplicateKey { table: String, key: String },

    #[error("malformed CSV in '{source_name}': {source}")]
    Csv {
        source_name: String,
        #[source]
        source: csv::Error,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("XLSX encoding failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl PipelineError {
    /// True for the conditions that only disqualify a single source.
    pub fn is_per_source(&self) -> bool {
        matches!(
            self,
            PipelineError::SourceUnavailable { .. }
                | PipelineError::MissingKeyColumn { .. }
                | PipelineError::NonNumericAggregation { .. }
                | PipelineError::ColumnCollision { .. }
                | PipelineError::DuplicateKey { .. }
                | PipelineError::Csv { .. }
        )
    }
}
