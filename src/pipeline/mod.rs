//! Pipeline stages
//!
//! Each stage plans its operations from a fresh walk of the tree and
//! hands them to the shared [`StageExecutor`](crate::execution::StageExecutor).

pub mod collector;
pub mod normalizer;
pub mod orchestrator;
pub mod pruner;
pub mod sorter;
pub mod unpacker;

pub use collector::CollectScope;
pub use orchestrator::{Organizer, RunReport};
