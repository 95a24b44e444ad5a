//! Error types for the organizer.
//!
//! `OrganizeError` aborts a run. `OperationError` belongs to a single file
//! operation and is normally isolated, counted and logged by the stage
//! executor instead of being propagated.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a run before or between stages
#[derive(Debug, Error)]
pub enum OrganizeError {
    #[error("Target folder does not exist: {}", .0.display())]
    TargetMissing(PathBuf),

    #[error("Target is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Refusing to organize protected path: {}", .0.display())]
    ProtectedPath(PathBuf),

    #[error("Invalid category table: {0}")]
    InvalidCategories(String),

    #[error("Stage '{stage}' failed: {failed} operation(s) failed, first error: {first_error}")]
    StageFailed {
        stage: String,
        failed: usize,
        first_error: String,
    },

    #[error("Worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, OrganizeError>;

/// Failure of one file operation
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("Source not found: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("Destination already exists: {}", .0.display())]
    DestinationExists(PathBuf),

    #[error("Cannot determine parent of {}", .0.display())]
    NoParent(PathBuf),

    #[error("Failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read archive {}: {source}", .path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
}

impl OperationError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        OperationError::Io {
            action,
            path: path.into(),
            source,
        }
    }
}
