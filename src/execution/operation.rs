//! File operations and their blocking execution
//!
//! Each `FileOperation` is one unit of work dispatched by the stage
//! executor. Execution is synchronous; the executor runs it on the
//! blocking pool.

use crate::error::OperationError;
use crate::pipeline::unpacker::extract_zip;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use super::executor::ConflictPolicy;

/// Upper bound on `_N` suffixes tried by [`ConflictPolicy::AutoRename`]
const MAX_RENAME_ATTEMPTS: usize = 1000;

/// A single filesystem operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FileOperation {
    /// Move a file to a new path
    Move {
        source: PathBuf,
        destination: PathBuf,
    },
    /// Rename a file within its directory
    Rename { path: PathBuf, new_name: String },
    /// Extract a ZIP archive into a directory
    Extract {
        archive: PathBuf,
        destination: PathBuf,
    },
    /// Remove a directory if it is empty
    RemoveEmptyDir { path: PathBuf },
}

impl FileOperation {
    /// Get a human-readable description of this operation
    pub fn description(&self) -> String {
        match self {
            FileOperation::Move {
                source,
                destination,
            } => format!("Move {} -> {}", source.display(), destination.display()),
            FileOperation::Rename { path, new_name } => {
                format!("Rename {} -> {}", path.display(), new_name)
            }
            FileOperation::Extract {
                archive,
                destination,
            } => format!("Extract {} -> {}", archive.display(), destination.display()),
            FileOperation::RemoveEmptyDir { path } => {
                format!("Remove empty folder {}", path.display())
            }
        }
    }
}

/// Outcome of a single operation execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// Operation completed successfully
    Completed,
    /// Operation completed under a generated name (includes new path)
    CompletedWithRename(PathBuf),
    /// Operation was skipped (includes reason)
    Skipped(String),
}

/// Execute one operation, applying `policy` when the target name is taken
pub fn execute_operation_sync(
    operation: &FileOperation,
    policy: ConflictPolicy,
) -> Result<ExecutionOutcome, OperationError> {
    match operation {
        FileOperation::Move {
            source,
            destination,
        } => relocate(source, destination, policy),

        FileOperation::Rename { path, new_name } => {
            let parent = path
                .parent()
                .ok_or_else(|| OperationError::NoParent(path.clone()))?;
            relocate(path, &parent.join(new_name), policy)
        }

        FileOperation::Extract {
            archive,
            destination,
        } => {
            let count = extract_zip(archive, destination)?;
            tracing::debug!(
                archive = %archive.display(),
                entries = count,
                "Archive extracted"
            );
            Ok(ExecutionOutcome::Completed)
        }

        FileOperation::RemoveEmptyDir { path } => {
            if !path.exists() {
                return Ok(ExecutionOutcome::Skipped(format!(
                    "Already removed: {}",
                    path.display()
                )));
            }
            // remove_dir refuses non-empty directories, so a folder that
            // gained entries since planning survives.
            fs::remove_dir(path).map_err(|e| OperationError::io("remove folder", path, e))?;
            Ok(ExecutionOutcome::Completed)
        }
    }
}

/// Move `source` to `destination` without ever replacing an existing entry
fn relocate(
    source: &Path,
    destination: &Path,
    policy: ConflictPolicy,
) -> Result<ExecutionOutcome, OperationError> {
    if source == destination {
        return Ok(ExecutionOutcome::Skipped(format!(
            "Already in place: {}",
            source.display()
        )));
    }

    if !source.exists() {
        return Err(OperationError::SourceMissing(source.to_path_buf()));
    }

    // Ensure destination parent exists
    if let Some(parent) = destination.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)
                .map_err(|e| OperationError::io("create folder", parent, e))?;
        }
    }

    match move_no_clobber(source, destination) {
        Ok(()) => Ok(ExecutionOutcome::Completed),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => match policy {
            ConflictPolicy::Fail => Err(OperationError::DestinationExists(destination.to_path_buf())),
            ConflictPolicy::Skip => Ok(ExecutionOutcome::Skipped(format!(
                "Destination exists: {}",
                destination.display()
            ))),
            ConflictPolicy::AutoRename => {
                for counter in 1..=MAX_RENAME_ATTEMPTS {
                    let candidate = numbered_path(destination, counter);
                    match move_no_clobber(source, &candidate) {
                        Ok(()) => return Ok(ExecutionOutcome::CompletedWithRename(candidate)),
                        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                        Err(e) => return Err(OperationError::io("move", source, e)),
                    }
                }
                Err(OperationError::DestinationExists(destination.to_path_buf()))
            }
        },
        Err(e) => Err(OperationError::io("move", source, e)),
    }
}

/// `dir/stem_N.ext` for `dir/stem.ext`
fn numbered_path(original: &Path, counter: usize) -> PathBuf {
    let parent = original.parent().unwrap_or(Path::new("."));
    let stem = original
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "file".to_string());
    let ext = original
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    parent.join(format!("{}_{}{}", stem, counter, ext))
}

/// Move a file, failing with `AlreadyExists` if `destination` is taken
///
/// A hard link claims the destination name atomically, so concurrent
/// moves into the same folder cannot overwrite each other. Filesystems
/// without hard links (or cross-device moves) fall back to an exclusive
/// copy followed by removal of the source.
fn move_no_clobber(source: &Path, destination: &Path) -> io::Result<()> {
    match fs::hard_link(source, destination) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Err(e),
        Err(_) => copy_exclusive(source, destination)?,
    }
    fs::remove_file(source).map_err(|e| rollback_destination(destination, e))
}

/// Undo a claimed destination after the source could not be removed
///
/// The file must end up in exactly one place, so the destination goes
/// and `cause` is returned for the caller to report.
fn rollback_destination(destination: &Path, cause: io::Error) -> io::Error {
    if let Err(e) = fs::remove_file(destination) {
        tracing::warn!(
            path = %destination.display(),
            error = %e,
            "Failed to remove destination after incomplete move"
        );
    }
    cause
}

fn copy_exclusive(source: &Path, destination: &Path) -> io::Result<()> {
    let mut input = File::open(source)?;
    let mut output = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(destination)?;

    let copied = io::copy(&mut input, &mut output).and_then(|_| {
        let permissions = input.metadata()?.permissions();
        output.set_permissions(permissions)
    });

    if let Err(e) = copied {
        drop(output);
        let _ = fs::remove_file(destination);
        return Err(e);
    }
    Ok(())
}
