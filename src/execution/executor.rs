//! Stage Executor
//!
//! Runs the operations of one pipeline stage on a bounded pool of
//! blocking workers. Operations inside a stage are independent and run in
//! parallel; `run_stage` returns only once every dispatched operation has
//! finished, which is the barrier between stages.

use crate::error::{OperationError, OrganizeError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Semaphore;

use super::operation::{execute_operation_sync, ExecutionOutcome, FileOperation};

/// Policy for handling destination conflicts during execution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Leave the file where it is and report a failure
    #[default]
    Fail,
    /// Leave the file where it is and report a skip
    Skip,
    /// Generate unique name (_1, _2, etc.) and proceed
    AutoRename,
}

/// What a failed operation means for the rest of the run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    /// Log and count the failure, keep going
    #[default]
    Isolate,
    /// Finish the current stage, then abort the run
    FailFast,
}

/// Result of executing one stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageReport {
    /// Stage name, as used in logs
    pub stage: String,
    /// Number of operations dispatched
    pub dispatched: usize,
    /// Number of operations completed successfully
    pub completed_count: usize,
    /// Number of operations completed under a generated name
    pub renamed_count: usize,
    /// Number of operations skipped
    pub skipped_count: usize,
    /// Number of operations that failed
    pub failed_count: usize,
    /// Error messages from failed operations
    pub errors: Vec<String>,
    /// Reasons for skipped operations
    pub skipped: Vec<String>,
}

impl StageReport {
    pub fn new(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            ..Self::default()
        }
    }

    /// Whether all operations completed successfully (no failures)
    pub fn success(&self) -> bool {
        self.failed_count == 0
    }

    /// Fold another report's counts into this one
    pub fn merge(&mut self, other: StageReport) {
        self.dispatched += other.dispatched;
        self.completed_count += other.completed_count;
        self.renamed_count += other.renamed_count;
        self.skipped_count += other.skipped_count;
        self.failed_count += other.failed_count;
        self.errors.extend(other.errors);
        self.skipped.extend(other.skipped);
    }

    /// Turn failures into an error under [`FailureMode::FailFast`]
    pub fn check(self, mode: FailureMode) -> Result<Self> {
        if mode == FailureMode::FailFast && !self.success() {
            return Err(OrganizeError::StageFailed {
                stage: self.stage.clone(),
                failed: self.failed_count,
                first_error: self.errors.first().cloned().unwrap_or_default(),
            });
        }
        Ok(self)
    }

    fn record(&mut self, operation: &FileOperation, outcome: ExecutionOutcome) {
        match outcome {
            ExecutionOutcome::Completed => {
                self.completed_count += 1;
                tracing::debug!(operation = %operation.description(), "Operation completed");
            }
            ExecutionOutcome::CompletedWithRename(new_path) => {
                self.renamed_count += 1;
                tracing::info!(
                    operation = %operation.description(),
                    new_path = %new_path.display(),
                    "Operation completed with rename"
                );
            }
            ExecutionOutcome::Skipped(reason) => {
                self.skipped_count += 1;
                tracing::debug!(
                    operation = %operation.description(),
                    reason = %reason,
                    "Operation skipped"
                );
                self.skipped.push(reason);
            }
        }
    }

    fn record_failure(&mut self, message: String) {
        self.failed_count += 1;
        tracing::warn!(stage = %self.stage, error = %message, "Operation failed");
        self.errors.push(message);
    }
}

/// Bounded worker pool shared by every stage of a run
#[derive(Debug, Clone)]
pub struct StageExecutor {
    permits: Arc<Semaphore>,
    workers: usize,
    on_conflict: ConflictPolicy,
}

impl StageExecutor {
    /// Create an executor running at most `workers` operations at once
    pub fn new(workers: usize, on_conflict: ConflictPolicy) -> Self {
        let workers = workers.max(1);
        Self {
            permits: Arc::new(Semaphore::new(workers)),
            workers,
            on_conflict,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn conflict_policy(&self) -> ConflictPolicy {
        self.on_conflict
    }

    /// Execute a stage's operations in parallel and wait for all of them
    ///
    /// Dispatch waits for a free worker before spawning the next
    /// operation, so at most `workers` operations of all stages sharing
    /// this executor are in flight at once. Failures never cut the stage
    /// short; they are recorded in the returned report.
    pub async fn run_stage(&self, stage: &str, operations: Vec<FileOperation>) -> StageReport {
        self.dispatch(stage, operations, execute_operation_sync).await
    }

    async fn dispatch<F>(&self, stage: &str, operations: Vec<FileOperation>, execute: F) -> StageReport
    where
        F: Fn(&FileOperation, ConflictPolicy) -> std::result::Result<ExecutionOutcome, OperationError>
            + Copy
            + Send
            + 'static,
    {
        let mut report = StageReport::new(stage);
        report.dispatched = operations.len();

        if operations.is_empty() {
            return report;
        }

        tracing::debug!(stage, operations = operations.len(), "Executing stage");

        let policy = self.on_conflict;
        let mut handles = Vec::with_capacity(operations.len());

        for operation in operations {
            let permit = match Arc::clone(&self.permits).acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    report.record_failure(format!("{}: {}", operation.description(), e));
                    continue;
                }
            };

            let handle = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                let outcome = execute(&operation, policy);
                (operation, outcome)
            });
            handles.push(handle);
        }

        // Wait for all operations in this stage to complete
        for handle in handles {
            match handle.await {
                Ok((operation, Ok(outcome))) => report.record(&operation, outcome),
                Ok((operation, Err(err))) => {
                    report.record_failure(format!("{}: {}", operation.description(), err));
                }
                Err(join_err) => {
                    report.record_failure(format!("Task panicked: {}", join_err));
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_run_stage_parallel() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("out");

        let operations: Vec<FileOperation> = (0..8)
            .map(|i| {
                let source = dir.path().join(format!("file_{}.txt", i));
                fs::write(&source, format!("{}", i)).unwrap();
                FileOperation::Move {
                    destination: target.join(format!("file_{}.txt", i)),
                    source,
                }
            })
            .collect();

        let executor = StageExecutor::new(3, ConflictPolicy::Fail);
        let report = executor.run_stage("move", operations).await;

        assert_eq!(report.dispatched, 8);
        assert_eq!(report.completed_count, 8);
        assert_eq!(report.failed_count, 0);
        assert!(report.success());

        for i in 0..8 {
            assert!(target.join(format!("file_{}.txt", i)).exists());
        }
    }

    #[tokio::test]
    async fn test_run_stage_isolates_failures() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("good.txt");
        fs::write(&good, "x").unwrap();

        let operations = vec![
            FileOperation::Move {
                source: dir.path().join("missing.txt"),
                destination: dir.path().join("out/missing.txt"),
            },
            FileOperation::Move {
                source: good.clone(),
                destination: dir.path().join("out/good.txt"),
            },
        ];

        let executor = StageExecutor::new(2, ConflictPolicy::Fail);
        let report = executor.run_stage("move", operations).await;

        assert_eq!(report.completed_count, 1);
        assert_eq!(report.failed_count, 1);
        assert!(report.errors[0].contains("missing.txt"));
        assert!(dir.path().join("out/good.txt").exists());
    }

    #[tokio::test]
    async fn test_concurrent_moves_never_overwrite() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("documents");

        // Same file name in several folders, all moved into one folder.
        let operations: Vec<FileOperation> = (0..6)
            .map(|i| {
                let sub = dir.path().join(format!("sub_{}", i));
                fs::create_dir(&sub).unwrap();
                let source = sub.join("notes.txt");
                fs::write(&source, format!("{}", i)).unwrap();
                FileOperation::Move {
                    source,
                    destination: target.join("notes.txt"),
                }
            })
            .collect();

        let executor = StageExecutor::new(6, ConflictPolicy::AutoRename);
        let report = executor.run_stage("move", operations).await;

        assert_eq!(report.failed_count, 0);
        assert_eq!(report.completed_count, 1);
        assert_eq!(report.renamed_count, 5);
        assert_eq!(fs::read_dir(&target).unwrap().count(), 6);
    }

    #[tokio::test]
    async fn test_panicking_operation_counts_as_failure() {
        let operations = vec![
            FileOperation::RemoveEmptyDir {
                path: "/nowhere/boom".into(),
            },
            FileOperation::RemoveEmptyDir {
                path: "/nowhere/fine".into(),
            },
        ];

        let executor = StageExecutor::new(2, ConflictPolicy::Fail);
        let report = executor
            .dispatch("remove", operations, |op, _| match op {
                FileOperation::RemoveEmptyDir { path } if path.ends_with("boom") => {
                    panic!("worker blew up")
                }
                _ => Ok(ExecutionOutcome::Completed),
            })
            .await;

        assert_eq!(report.completed_count, 1);
        assert_eq!(report.failed_count, 1);
        assert!(report.errors[0].starts_with("Task panicked"));
    }

    #[tokio::test]
    async fn test_empty_stage() {
        let executor = StageExecutor::new(1, ConflictPolicy::Fail);
        let report = executor.run_stage("nothing", Vec::new()).await;
        assert_eq!(report, StageReport::new("nothing"));
    }

    #[test]
    fn test_check_fail_fast() {
        let mut report = StageReport::new("sort");
        report.failed_count = 1;
        report.errors.push("boom".to_string());

        assert!(report.clone().check(FailureMode::Isolate).is_ok());
        let err = report.check(FailureMode::FailFast).unwrap_err();
        assert!(matches!(err, OrganizeError::StageFailed { failed: 1, .. }));
    }

    #[test]
    fn test_merge() {
        let mut a = StageReport::new("a");
        a.completed_count = 2;
        a.dispatched = 2;
        let mut b = StageReport::new("b");
        b.failed_count = 1;
        b.dispatched = 1;
        b.errors.push("e".to_string());

        a.merge(b);
        assert_eq!(a.stage, "a");
        assert_eq!(a.dispatched, 3);
        assert_eq!(a.completed_count, 2);
        assert_eq!(a.failed_count, 1);
        assert!(!a.success());
    }

    #[test]
    fn test_workers_at_least_one() {
        assert_eq!(StageExecutor::new(0, ConflictPolicy::Fail).workers(), 1);
    }
}
