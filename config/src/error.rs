//! Error types for set operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while loading, validating or emitting portage sets
#[derive(Error, Debug)]
pub enum SetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{file}:{line}: parse error: {reason}")]
    Parse {
        file: String,
        line: usize,
        reason: String,
    },

    #[error("set file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("{} exists, aborting (use --force to overwrite)", .0.display())]
    OutputCollision(PathBuf),

    #[error("invalid package atom: {0}")]
    InvalidAtom(String),
}

/// Result type alias for set operations
pub type Result<T> = std::result::Result<T, SetError>;
