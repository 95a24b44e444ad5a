pub mod classify;
pub mod config;
pub mod error;
pub mod execution;
pub mod pipeline;
pub mod security;
pub mod walker;

pub use classify::{Category, CategoryTable, ExtensionSet, UNKNOWNS};
pub use config::OrganizerConfig;
pub use error::{OperationError, OrganizeError, Result};
pub use execution::{ConflictPolicy, FailureMode, StageExecutor, StageReport};
pub use pipeline::{CollectScope, Organizer, RunReport};

use tracing_subscriber::EnvFilter;

/// Initialize tracing with RUST_LOG env filter
///
/// Default: warn for dependencies, info for this crate (stage summaries
/// and per-file failures visible). Use RUST_LOG=sortfiles=debug for
/// per-operation logs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,sortfiles=info")),
        )
        .with_target(false)
        .try_init();
}
