//! File actions module.
//!
//! Currently a single action: removing the members a [`Verdict`] marked
//! for deletion, optionally as a dry run.
//!
//! [`Verdict`]: crate::resolver::Verdict

pub mod delete;

pub use delete::{
    remove_verified, validate_preserves_copy, DeleteError, ExecutionReport, Executor,
    ExecutorConfig, FileOutcome,
};
