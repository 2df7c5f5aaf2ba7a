//! Deletion executor.
//!
//! # Overview
//!
//! Applies resolved [`Verdict`]s to the filesystem:
//! - Only paths marked [`Action::Delete`] are touched
//! - Dry-run mode logs every intended removal and mutates nothing
//! - Each file is re-checked against its scanned size before removal
//! - Per-file failures are recorded and processing continues
//! - A shutdown request stops new removals; the rest are reported as skipped
//!
//! Duplicate sets are disjoint, so verdicts run in parallel.
//!
//! # Example
//!
//! ```no_run
//! use refdup::actions::delete::{Executor, ExecutorConfig};
//! # fn verdicts() -> Vec<refdup::resolver::Verdict> { Vec::new() }
//!
//! let executor = Executor::new(ExecutorConfig::default().with_dry_run(true));
//! let report = executor.execute_all(&verdicts());
//! println!("{}", report.summary());
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytesize::ByteSize;
use rayon::prelude::*;
use thiserror::Error;

use crate::resolver::{Action, Verdict};

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// File size changed since it was fingerprinted.
    #[error("file modified since scan: {path} (size {expected} -> {actual})")]
    Modified {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    /// Removing the path would leave no copy of the content.
    #[error("refusing to delete every copy in set {digest}")]
    AllCopiesWouldBeDeleted { digest: String },

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// Get the path associated with this error (if any).
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::Modified { path: p, .. }
            | Self::Io { path: p, .. } => Some(p),
            Self::AllCopiesWouldBeDeleted { .. } => None,
        }
    }
}

/// What happened to one path marked for deletion.
#[derive(Debug)]
pub enum FileOutcome {
    /// File was removed.
    Deleted { path: PathBuf, size: u64 },
    /// Dry-run: file would have been removed.
    WouldDelete { path: PathBuf, size: u64 },
    /// Removal failed; the file was skipped.
    Failed(DeleteError),
    /// Not attempted because shutdown was requested.
    Skipped(PathBuf),
}

/// Per-run tally of executor outcomes.
#[derive(Debug, Default)]
pub struct ExecutionReport {
    /// Outcomes in verdict order.
    pub outcomes: Vec<FileOutcome>,
    /// Whether shutdown cut the run short.
    pub interrupted: bool,
}

impl ExecutionReport {
    fn merge(&mut self, other: Self) {
        self.outcomes.extend(other.outcomes);
        self.interrupted |= other.interrupted;
    }

    /// Number of files removed.
    #[must_use]
    pub fn deleted_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, FileOutcome::Deleted { .. }))
            .count()
    }

    /// Number of files a dry run would have removed.
    #[must_use]
    pub fn would_delete_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, FileOutcome::WouldDelete { .. }))
            .count()
    }

    /// Number of skipped files.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, FileOutcome::Skipped(_)))
            .count()
    }

    /// Failures, in verdict order.
    pub fn failures(&self) -> impl Iterator<Item = &DeleteError> {
        self.outcomes.iter().filter_map(|o| match o {
            FileOutcome::Failed(e) => Some(e),
            _ => None,
        })
    }

    /// Number of failed removals.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    /// Bytes freed, or that would be freed in a dry run.
    #[must_use]
    pub fn bytes_freed(&self) -> u64 {
        self.outcomes
            .iter()
            .map(|o| match o {
                FileOutcome::Deleted { size, .. } | FileOutcome::WouldDelete { size, .. } => *size,
                _ => 0,
            })
            .sum()
    }

    /// Check if every attempted removal succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failure_count() == 0
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        let freed = ByteSize(self.bytes_freed());
        let mut out = if self.would_delete_count() > 0 && self.deleted_count() == 0 {
            format!(
                "Would delete {} file(s), freeing {}",
                self.would_delete_count(),
                freed
            )
        } else {
            format!("Deleted {} file(s), freed {}", self.deleted_count(), freed)
        };
        if !self.all_succeeded() {
            out.push_str(&format!(", {} failed", self.failure_count()));
        }
        if self.skipped_count() > 0 {
            out.push_str(&format!(", {} skipped", self.skipped_count()));
        }
        out
    }
}

/// Configuration for the executor.
#[derive(Debug, Clone, Default)]
pub struct ExecutorConfig {
    /// Log removals without performing them.
    pub dry_run: bool,
    /// Stop issuing removals once set.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
}

impl ExecutorConfig {
    /// Enable or disable dry-run mode.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set the shutdown flag.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }
}

/// Applies verdicts to the filesystem.
#[derive(Debug, Clone, Default)]
pub struct Executor {
    config: ExecutorConfig,
}

impl Executor {
    /// Create an executor.
    #[must_use]
    pub fn new(config: ExecutorConfig) -> Self {
        Self { config }
    }

    fn is_shutdown_requested(&self) -> bool {
        self.config
            .shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Apply one verdict.
    ///
    /// Keep and undecided paths are never touched. Failures are logged
    /// and recorded in the report.
    pub fn execute(&self, verdict: &Verdict) -> ExecutionReport {
        let mut report = ExecutionReport::default();

        if let Err(e) = validate_preserves_copy(verdict) {
            log::error!("{}", e);
            report.outcomes.push(FileOutcome::Failed(e));
            return report;
        }

        for decision in verdict.with_action(Action::Delete) {
            let path = &decision.path;

            if self.is_shutdown_requested() {
                log::debug!("Shutdown requested, skipping {}", path.display());
                report.interrupted = true;
                report.outcomes.push(FileOutcome::Skipped(path.clone()));
                continue;
            }

            if self.config.dry_run {
                log::info!(
                    "Would delete {} because {}",
                    path.display(),
                    decision.reason
                );
                report.outcomes.push(FileOutcome::WouldDelete {
                    path: path.clone(),
                    size: verdict.size(),
                });
                continue;
            }

            log::info!("Deleting {} because {}", path.display(), decision.reason);
            match remove_verified(path, verdict.size()) {
                Ok(size) => report.outcomes.push(FileOutcome::Deleted {
                    path: path.clone(),
                    size,
                }),
                Err(e) => {
                    log::warn!("Failed to delete {}: {}", path.display(), e);
                    report.outcomes.push(FileOutcome::Failed(e));
                }
            }
        }

        report
    }

    /// Apply every verdict, running independent sets in parallel.
    ///
    /// Outcomes are reported in verdict order regardless of scheduling.
    pub fn execute_all(&self, verdicts: &[Verdict]) -> ExecutionReport {
        let reports: Vec<ExecutionReport> =
            verdicts.par_iter().map(|v| self.execute(v)).collect();

        let mut total = ExecutionReport::default();
        for report in reports {
            total.merge(report);
        }

        log::debug!("{}", total.summary());
        total
    }
}

/// Remove `path` if its size still equals `expected_size`.
///
/// # Errors
///
/// - `NotFound` if the file is already gone
/// - `PermissionDenied` if removal is not allowed
/// - `Modified` if the size changed since the scan
pub fn remove_verified(path: &Path, expected_size: u64) -> Result<u64, DeleteError> {
    let metadata = fs::symlink_metadata(path).map_err(|e| DeleteError::from_io(path, e))?;

    if metadata.len() != expected_size {
        return Err(DeleteError::Modified {
            path: path.to_path_buf(),
            expected: expected_size,
            actual: metadata.len(),
        });
    }

    fs::remove_file(path).map_err(|e| DeleteError::from_io(path, e))?;
    log::debug!("Removed {} ({} bytes)", path.display(), expected_size);

    Ok(expected_size)
}

/// Check that a verdict leaves at least one member in place.
///
/// # Errors
///
/// Returns `AllCopiesWouldBeDeleted` if every member is marked for deletion.
pub fn validate_preserves_copy(verdict: &Verdict) -> Result<(), DeleteError> {
    let preserved = verdict
        .decisions()
        .iter()
        .filter(|d| d.action != Action::Delete)
        .count();

    if preserved == 0 && !verdict.decisions().is_empty() {
        return Err(DeleteError::AllCopiesWouldBeDeleted {
            digest: crate::scanner::hash_to_hex(verdict.digest()),
        });
    }
    Ok(())
}
