//! Execution Engine Module
//!
//! Parallel execution of file operations. Operations of one stage have no
//! dependencies between them and run on a bounded worker pool; stages run
//! one after another.

pub mod executor;
pub mod operation;

pub use executor::{ConflictPolicy, FailureMode, StageExecutor, StageReport};
pub use operation::{execute_operation_sync, ExecutionOutcome, FileOperation};
