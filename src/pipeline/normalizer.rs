//! File name normalization
//!
//! Polish diacritics become their ASCII base letter and spaces become
//! underscores. Every other character is kept as is.

use crate::error::Result;
use crate::execution::{FileOperation, StageExecutor, StageReport};
use crate::walker::walk_files;
use std::path::Path;

fn substitute(ch: char) -> Option<char> {
    let replacement = match ch {
        'Ą' => 'A',
        'ą' => 'a',
        'Ć' => 'C',
        'ć' => 'c',
        'Ę' => 'E',
        'ę' => 'e',
        'Ł' => 'L',
        'ł' => 'l',
        'Ń' => 'N',
        'ń' => 'n',
        'Ó' => 'O',
        'ó' => 'o',
        'Ś' => 'S',
        'ś' => 's',
        'Ź' => 'Z',
        'ź' => 'z',
        'Ż' => 'Z',
        'ż' => 'z',
        ' ' => '_',
        _ => return None,
    };
    Some(replacement)
}

/// Normalized form of a file name
///
/// Replacements are never themselves replaced, so normalizing twice gives
/// the same result as normalizing once.
pub fn normalize(name: &str) -> String {
    name.chars().map(|ch| substitute(ch).unwrap_or(ch)).collect()
}

/// Renames for every file under `root` whose name changes when normalized
pub fn plan_normalize(root: &Path) -> Vec<FileOperation> {
    walk_files(root)
        .into_iter()
        .filter_map(|entry| {
            let Some(name) = entry.name_str() else {
                tracing::debug!(
                    path = %entry.path().display(),
                    "Leaving non UTF-8 file name as is"
                );
                return None;
            };
            let normalized = normalize(name);
            (normalized != name).then(|| FileOperation::Rename {
                path: entry.path(),
                new_name: normalized,
            })
        })
        .collect()
}

/// Normalize every file name under `root` and wait for all renames
pub async fn normalize_all(executor: &StageExecutor, root: &Path) -> Result<StageReport> {
    let operations = {
        let root = root.to_path_buf();
        tokio::task::spawn_blocking(move || plan_normalize(&root)).await?
    };

    let report = executor.run_stage("normalize names", operations).await;
    tracing::info!(
        renamed = report.completed_count + report.renamed_count,
        failed = report.failed_count,
        "File names normalized"
    );
    Ok(report)
}
