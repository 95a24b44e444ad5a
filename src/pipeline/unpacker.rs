//! Archive unpacking
//!
//! Every `.zip` under the target root is extracted into a sibling folder
//! named after the archive. The archive itself stays where it is. Other
//! archive formats are sorted like any other file but never unpacked.

use crate::error::{OperationError, Result};
use crate::execution::{FileOperation, StageExecutor, StageReport};
use crate::walker::walk_files;
use std::fs::{self, File};
use std::io;
use std::path::Path;
use zip::ZipArchive;

/// Archive suffixes the unpacker extracts
pub const ARCHIVE_SUFFIXES: &[&str] = &[".zip"];

/// Extract operations for every supported archive under `root`
pub fn plan_unpack(root: &Path) -> Vec<FileOperation> {
    walk_files(root)
        .into_iter()
        .filter_map(|entry| {
            if !ARCHIVE_SUFFIXES.contains(&entry.extension().as_str()) {
                return None;
            }
            let stem = Path::new(&entry.name).file_stem()?;
            Some(FileOperation::Extract {
                destination: entry.dir.join(stem),
                archive: entry.path(),
            })
        })
        .collect()
}

/// Extract every archive under `root` and wait for all of them
///
/// A failing archive is reported in the stage report and does not stop
/// the others.
pub async fn unpack_all(executor: &StageExecutor, root: &Path) -> Result<StageReport> {
    let operations = {
        let root = root.to_path_buf();
        tokio::task::spawn_blocking(move || plan_unpack(&root)).await?
    };

    let report = executor.run_stage("unpack archives", operations).await;
    tracing::info!(
        extracted = report.completed_count,
        failed = report.failed_count,
        "Archives unpacked"
    );
    Ok(report)
}

/// Extract a ZIP archive into `destination`, returning the number of files written
///
/// The archive is read before `destination` is created, so an unreadable
/// archive leaves nothing behind. Entries whose path would land outside
/// `destination` are skipped. Existing files are overwritten.
pub fn extract_zip(archive: &Path, destination: &Path) -> std::result::Result<usize, OperationError> {
    let file = File::open(archive).map_err(|e| OperationError::io("open archive", archive, e))?;
    let mut zip = ZipArchive::new(file).map_err(|source| OperationError::Archive {
        path: archive.to_path_buf(),
        source,
    })?;

    fs::create_dir_all(destination)
        .map_err(|e| OperationError::io("create folder", destination, e))?;

    let mut extracted = 0;
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(|source| OperationError::Archive {
            path: archive.to_path_buf(),
            source,
        })?;

        let Some(relative) = entry.enclosed_name() else {
            tracing::warn!(
                archive = %archive.display(),
                entry = entry.name(),
                "Skipping archive entry with unsafe path"
            );
            continue;
        };
        let out_path = destination.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)
                .map_err(|e| OperationError::io("create folder", &out_path, e))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| OperationError::io("create folder", parent, e))?;
        }
        let mut out = File::create(&out_path)
            .map_err(|e| OperationError::io("create file", &out_path, e))?;
        io::copy(&mut entry, &mut out)
            .map_err(|e| OperationError::io("extract", &out_path, e))?;
        extracted += 1;
    }

    Ok(extracted)
}
