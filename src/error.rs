use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a pipeline run.
///
/// Per-row data-quality issues (blank cells, implausible values, category
/// variants) are *not* errors: the cleaner resolves them deterministically.
/// Only an unreadable source, an uncoercible cell, or an inconsistent rule
/// set is fatal.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The source file is unreadable or structurally malformed
    /// (wrong column set, ragged rows, undecodable content).
    #[error("failed to load {path}: {reason}")]
    Load { path: PathBuf, reason: String },

    /// A cell's raw value cannot be converted to the column's declared type.
    /// `row` is the 1-based data row number (header excluded).
    #[error("row {row}, column '{column}': cannot coerce value '{value}'")]
    TypeCoercion {
        row: usize,
        column: &'static str,
        value: String,
    },

    /// The cleaning rule set is internally inconsistent. Detected before any
    /// row is processed.
    #[error("invalid cleaning rules: {0}")]
    Configuration(String),
}

impl PipelineError {
    pub(crate) fn load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        PipelineError::Load {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
