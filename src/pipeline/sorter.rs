//! Sorter: moves files into their category folder.

use crate::classify::{CategoryTable, ExtensionSet};
use crate::error::Result;
use crate::execution::{FileOperation, StageExecutor, StageReport};
use crate::walker::walk_files_excluding;
use futures::future::join_all;
use std::path::{Path, PathBuf};

/// Moves for every file under `root` whose extension is in `extensions`
///
/// Files already sitting directly in `root/category` are left out, as is
/// everything below a directory listed in `skip`.
pub fn plan_sort(
    root: &Path,
    category: &str,
    extensions: &ExtensionSet,
    skip: &[PathBuf],
) -> Vec<FileOperation> {
    let folder = root.join(category);

    walk_files_excluding(root, skip)
        .into_iter()
        .filter(|entry| extensions.contains(entry.extension().as_str()))
        .filter(|entry| entry.dir != folder)
        .map(|entry| FileOperation::Move {
            destination: folder.join(&entry.name),
            source: entry.path(),
        })
        .collect()
}

/// Sort one category and wait for all of its moves
pub async fn sort(
    executor: &StageExecutor,
    root: &Path,
    category: &str,
    extensions: &ExtensionSet,
    skip: &[PathBuf],
) -> Result<StageReport> {
    let operations = {
        let root = root.to_path_buf();
        let category = category.to_string();
        let extensions = extensions.clone();
        let skip = skip.to_vec();
        tokio::task::spawn_blocking(move || plan_sort(&root, &category, &extensions, &skip))
            .await?
    };

    let report = executor
        .run_stage(&format!("sort {}", category), operations)
        .await;

    tracing::info!(
        category,
        moved = report.completed_count + report.renamed_count,
        failed = report.failed_count,
        "Category sorted"
    );
    Ok(report)
}

/// Sort every category of `table` concurrently
///
/// Category extension sets are disjoint, so the concurrent sorts never
/// touch the same file. All of them share the executor's worker budget.
pub async fn sort_known(
    executor: &StageExecutor,
    root: &Path,
    table: &CategoryTable,
) -> Result<StageReport> {
    let sorts = table
        .categories()
        .iter()
        .map(|category| sort(executor, root, &category.name, &category.extensions, &[]));

    let mut report = StageReport::new("sort known categories");
    for result in join_all(sorts).await {
        report.merge(result?);
    }
    Ok(report)
}
