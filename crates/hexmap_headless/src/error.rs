//! Headless driver errors.

use std::path::PathBuf;

use hexmap_core::MapError;
use thiserror::Error;

/// Error type for sessions, scripts and filesystem adapters.
#[derive(Error, Debug)]
pub enum HeadlessError {
    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    /// Failed to read or write a file or stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A script line is not a valid command.
    #[error("{path}:{line}: {source}")]
    Script {
        /// Script file.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// Parse failure.
        source: serde_json::Error,
    },
    /// Editor rejected an operation or a document.
    #[error(transparent)]
    Core(#[from] MapError),
    /// Replays of the same script ended in different states.
    #[error("replay is non-deterministic: hashes {0:?}")]
    NonDeterministic(Vec<u64>),
}

/// Result alias for the headless crate.
pub type Result<T> = std::result::Result<T, HeadlessError>;
