//! Error types for cuefix
//!
//! Two tiers:
//! - [`Error`] is fatal for a run (malformed lookup tables, I/O, bad config).
//!   Nothing is written when one of these surfaces.
//! - [`RowError`] is scoped to a single CSV row. The pipeline logs it, records
//!   the row as skipped and moves on.

use std::fmt;
use thiserror::Error;

/// Common result type for cuefix operations
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors that abort a run
#[derive(Error, Debug)]
pub enum Error {
    /// A lookup table or the cue CSV is missing required shape
    #[error("Malformed {table}: {detail}")]
    MalformedInput { table: String, detail: String },

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON syntax or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV reader error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn malformed(table: &str, detail: impl Into<String>) -> Self {
        Error::MalformedInput {
            table: table.to_string(),
            detail: detail.into(),
        }
    }
}

/// Lookup stage at which category resolution failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStage {
    /// No recorded path contains the filename
    Path,
    /// The resolved key has no entry in the data table
    CategoryId,
    /// The category id has no entry in the categories table
    Category,
}

impl fmt::Display for LookupStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LookupStage::Path => "path",
            LookupStage::CategoryId => "category_id",
            LookupStage::Category => "category",
        };
        f.write_str(s)
    }
}

/// Which file of a combined (two-file) resolution failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRole {
    /// Single-file resolution, or the file supplying `category_key`
    Primary,
    /// The file supplying `name` and `slug` in combined mode
    Secondary,
}

/// Category resolution failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{stage} lookup failed for {file} ({role:?} file): {key} not found")]
pub struct ResolutionError {
    /// Filename that was being resolved
    pub file: String,
    /// Role of the file in the resolution
    pub role: FileRole,
    /// Stage that failed
    pub stage: LookupStage,
    /// Value looked up at the failing stage (filename, key or category id)
    pub key: String,
}

/// Row-scoped failures; the row is skipped and no pk is consumed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    /// `type` column not in the configured whitelist
    #[error("invalid type: {0}")]
    TypeRejected(String),

    /// Non-empty cue that does not match `<int>-<int|end>`
    #[error("invalid cue format: {0}")]
    CueFormat(String),

    /// Category resolution failed
    #[error(transparent)]
    NotFound(#[from] ResolutionError),

    /// Combined mode requires a `category_pk` value
    #[error("missing category_pk value for combined resolution")]
    MissingPrimary,

    /// Every pk up to `u64::MAX` has been assigned in this run
    #[error("pk range exhausted")]
    PkExhausted,
}
