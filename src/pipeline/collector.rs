//! Unknown-extension collection.

use crate::classify::{CategoryTable, ExtensionSet};
use crate::walker::walk_files_excluding;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Which part of the tree contributes to the extension universe
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectScope {
    /// Walk the entire tree, category folders included
    #[default]
    WholeTree,
    /// Leave out the category folders directly under root
    ///
    /// Files with unknown extensions that already sit in a category folder
    /// then stay there instead of being pulled into `unknowns`.
    SkipCategoryFolders,
}

/// Every extension present under `root`, `""` for extensionless files
pub fn collect_extensions(root: &Path, skip: &[PathBuf]) -> ExtensionSet {
    walk_files_excluding(root, skip)
        .iter()
        .map(|entry| entry.extension())
        .collect()
}

/// Directories a `scope` leaves out of collection and of the unknowns sort
pub fn scope_skips(root: &Path, table: &CategoryTable, scope: CollectScope) -> Vec<PathBuf> {
    match scope {
        CollectScope::WholeTree => Vec::new(),
        CollectScope::SkipCategoryFolders => table
            .folder_names()
            .iter()
            .map(|name| root.join(name))
            .collect(),
    }
}

/// Extensions under `root` that no category of `table` claims
pub fn collect_unknown_extensions(
    root: &Path,
    table: &CategoryTable,
    scope: CollectScope,
) -> ExtensionSet {
    let skip = scope_skips(root, table, scope);
    let seen = collect_extensions(root, &skip);
    let unknown = table.unknown_extensions(&seen);
    tracing::debug!(seen = seen.len(), unknown = ?unknown, "Collected extensions");
    unknown
}
