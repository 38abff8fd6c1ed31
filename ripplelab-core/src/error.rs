//! Structured error types for data operations.
//!
//! Per-instrument conditions (missing file, excluded instrument, malformed
//! rows) are reported as `Ok(None)` by the pipeline entry points and never
//! surface as errors; this enum covers the conditions that do.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("file does not exist: {0}")]
    MissingFile(PathBuf),

    #[error("directory does not exist: {0}")]
    MissingDirectory(PathBuf),

    #[error("malformed data in {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("http error for {symbol}: {reason}")]
    Http { symbol: String, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
