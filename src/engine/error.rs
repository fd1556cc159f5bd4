use std::path::PathBuf;
use thiserror::Error;

/// Fatal conversion errors. None of these are retried; a job either
/// produces a complete output file or nothing.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("usage error: {0}")]
    Usage(String),

    #[error("failed to probe '{path}': {reason}")]
    Probe { path: PathBuf, reason: String },

    #[error("frame extraction failed: {0}")]
    Extraction(String),

    #[error("failed to recode frame {index}: {reason}")]
    Recode { index: usize, reason: String },

    #[error("failed to assemble animation: {0}")]
    Assembly(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
