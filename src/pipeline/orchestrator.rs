//! Orchestrator
//!
//! Runs the stages in their fixed order. Each stage is a barrier: the next
//! one starts only after every operation of the previous one finished.
//!
//! 1. create category folders (plus `unknowns`)
//! 2. sort known categories, concurrently across categories
//! 3. collect extensions and compute the unknown set
//! 4. sort unknowns
//! 5. unpack archives
//! 6. prune empty folders, keeping the category folders
//! 7. normalize file names

use crate::classify::{ExtensionSet, UNKNOWNS};
use crate::config::OrganizerConfig;
use crate::error::{OrganizeError, Result};
use crate::execution::{StageExecutor, StageReport};
use crate::security::PathValidator;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use super::collector::{collect_unknown_extensions, scope_skips};
use super::normalizer::normalize_all;
use super::pruner::prune_empty;
use super::sorter::{sort, sort_known};
use super::unpacker::unpack_all;

/// Summary of a complete run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// Canonical target folder
    pub root: PathBuf,
    /// Category folders that did not exist before the run
    pub created_folders: Vec<String>,
    /// Extensions sorted into `unknowns`
    pub unknown_extensions: ExtensionSet,
    /// One report per stage, in execution order
    pub stages: Vec<StageReport>,
}

impl RunReport {
    pub fn total_failed(&self) -> usize {
        self.stages.iter().map(|s| s.failed_count).sum()
    }

    pub fn success(&self) -> bool {
        self.total_failed() == 0
    }

    pub fn stage(&self, name: &str) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.stage == name)
    }
}

/// Runs the organize pipeline over a target folder
pub struct Organizer {
    config: OrganizerConfig,
    executor: StageExecutor,
}

impl Organizer {
    pub fn new(config: OrganizerConfig) -> Self {
        let executor = StageExecutor::new(config.workers, config.on_conflict);
        Self { config, executor }
    }

    pub fn config(&self) -> &OrganizerConfig {
        &self.config
    }

    /// Organize `target`
    ///
    /// Fails before touching anything if `target` is missing, not a
    /// directory or protected. Per-file failures afterwards are handled
    /// according to the configured [`FailureMode`](crate::execution::FailureMode).
    pub async fn run(&self, target: &Path) -> Result<RunReport> {
        let root = PathValidator::validate_target(target)?;
        let table = &self.config.categories;
        let mode = self.config.failure_mode;

        tracing::info!(
            root = %root.display(),
            workers = self.executor.workers(),
            "Organizing folder"
        );

        let created_folders = create_category_folders(&root, &table.folder_names())?;
        let mut stages = Vec::new();

        let known = sort_known(&self.executor, &root, table).await?;
        stages.push(known.check(mode)?);

        let unknown_extensions = {
            let root = root.clone();
            let table = table.clone();
            let scope = self.config.collect_scope;
            tokio::task::spawn_blocking(move || collect_unknown_extensions(&root, &table, scope))
                .await?
        };
        tracing::info!(unknown = ?unknown_extensions, "Unknown extensions collected");

        let skip = scope_skips(&root, table, self.config.collect_scope);
        let unknowns = sort(&self.executor, &root, UNKNOWNS, &unknown_extensions, &skip).await?;
        stages.push(unknowns.check(mode)?);

        let unpacked = unpack_all(&self.executor, &root).await?;
        stages.push(unpacked.check(mode)?);

        let excluded: BTreeSet<String> = table.folder_names().into_iter().collect();
        let pruned = prune_empty(&self.executor, &root, &excluded).await?;
        stages.push(pruned.check(mode)?);

        let normalized = normalize_all(&self.executor, &root).await?;
        stages.push(normalized.check(mode)?);

        let report = RunReport {
            root,
            created_folders,
            unknown_extensions,
            stages,
        };

        tracing::info!(
            failed = report.total_failed(),
            "Organizing finished"
        );
        Ok(report)
    }
}

/// Create each folder directly under `root` unless it already exists
///
/// Returns the names that were created.
pub fn create_category_folders(root: &Path, names: &[String]) -> Result<Vec<String>> {
    let mut created = Vec::new();
    for name in names {
        let path = root.join(name);
        if path.is_dir() {
            continue;
        }
        fs::create_dir(&path).map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "Failed to create category folder");
            OrganizeError::Io(e)
        })?;
        created.push(name.clone());
    }
    Ok(created)
}
