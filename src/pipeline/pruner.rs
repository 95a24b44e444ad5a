//! Empty-folder pruning.

use crate::error::Result;
use crate::execution::{FileOperation, StageExecutor, StageReport};
use crate::walker::walk_dirs_by_depth;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

fn is_empty_dir(path: &Path) -> bool {
    fs::read_dir(path)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false)
}

fn is_excluded(path: &Path, excluded: &BTreeSet<String>) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| excluded.contains(name))
}

/// Removals for the directories of one depth group that are empty right now
pub fn plan_prune_level(level: &[PathBuf], excluded: &BTreeSet<String>) -> Vec<FileOperation> {
    level
        .iter()
        .filter(|dir| !is_excluded(dir, excluded))
        .filter(|dir| is_empty_dir(dir))
        .map(|dir| FileOperation::RemoveEmptyDir { path: dir.clone() })
        .collect()
}

/// Remove every empty directory below `root` whose name is not in `excluded`
///
/// Depth groups run deepest first with a barrier in between, and each
/// group is re-checked for emptiness only after the deeper one finished.
/// A folder holding nothing but empty folders is therefore removed too.
/// `root` itself is never removed.
pub async fn prune_empty(
    executor: &StageExecutor,
    root: &Path,
    excluded: &BTreeSet<String>,
) -> Result<StageReport> {
    let levels = {
        let root = root.to_path_buf();
        tokio::task::spawn_blocking(move || walk_dirs_by_depth(&root)).await?
    };

    let mut report = StageReport::new("prune empty folders");
    for level in levels {
        let operations = {
            let excluded = excluded.clone();
            tokio::task::spawn_blocking(move || plan_prune_level(&level, &excluded)).await?
        };
        report.merge(executor.run_stage("prune empty folders", operations).await);
    }

    tracing::info!(
        removed = report.completed_count,
        failed = report.failed_count,
        "Empty folders pruned"
    );
    Ok(report)
}
