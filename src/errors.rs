// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StalkerError {
    /// Invalid command-line input detected after argument parsing.
    #[error("usage error: {0}")]
    Usage(String),

    /// The OS refused to create the child process.
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A spawn was requested while the previous child is still alive.
    #[error("command is already running")]
    AlreadyRunning,

    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error("invalid ignore pattern: {0}")]
    Pattern(#[from] globset::Error),
}

pub type Result<T> = std::result::Result<T, StalkerError>;
