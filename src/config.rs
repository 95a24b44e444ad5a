//! Organizer configuration

use crate::classify::CategoryTable;
use crate::execution::{ConflictPolicy, FailureMode};
use crate::pipeline::collector::CollectScope;

/// Configuration for a run of the organizer
#[derive(Debug, Clone)]
pub struct OrganizerConfig {
    /// Category table used for sorting
    pub categories: CategoryTable,

    /// Maximum number of filesystem operations in flight
    pub workers: usize,

    /// How to handle "destination already exists" conflicts
    pub on_conflict: ConflictPolicy,

    /// Whether a failed operation aborts the run after its stage
    pub failure_mode: FailureMode,

    /// Which folders feed the unknown-extension collection
    pub collect_scope: CollectScope,
}

impl Default for OrganizerConfig {
    fn default() -> Self {
        Self {
            categories: CategoryTable::default(),
            workers: num_cpus::get().max(1),
            on_conflict: ConflictPolicy::default(),
            failure_mode: FailureMode::default(),
            collect_scope: CollectScope::default(),
        }
    }
}

impl OrganizerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_categories(mut self, categories: CategoryTable) -> Self {
        self.categories = categories;
        self
    }

    /// Set the worker count (values below 1 are raised to 1)
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.on_conflict = policy;
        self
    }

    pub fn with_failure_mode(mut self, mode: FailureMode) -> Self {
        self.failure_mode = mode;
        self
    }

    pub fn with_collect_scope(mut self, scope: CollectScope) -> Self {
        self.collect_scope = scope;
        self
    }
}
