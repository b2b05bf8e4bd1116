//! Error types for the backup/restore job.
//!
//! Every variant is fatal: the job logs it once from `main` and exits with
//! status 1.  Nothing is retried.  Underlying I/O errors are kept as
//! `#[source]` and show up when the error chain is printed with `{:#}`.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using the job's [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A required environment variable is unset or empty.
    #[error("Environment variable {0} is not set")]
    MissingVar(&'static str),

    #[error("Invalid ACTION: {0}")]
    InvalidAction(String),

    #[error("Invalid BACKUP_TYPE: {0}")]
    InvalidBackupType(String),

    /// A variable is present but cannot be interpreted (e.g. a non-numeric port).
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    /// An external tool could not be started at all.
    #[error("failed to spawn {program}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// An external tool ran and exited non-zero.
    #[error("{step} failed: {status}")]
    ToolFailed { step: &'static str, status: String },

    /// The dump or restored artifact contained no bytes.
    #[error("{0}")]
    EmptyArtifact(&'static str),

    #[error("{action} {}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Build a [`Error::ToolFailed`] from a step label and an exit description.
    pub fn tool(step: &'static str, status: impl Into<String>) -> Self {
        Error::ToolFailed {
            step,
            status: status.into(),
        }
    }
}
