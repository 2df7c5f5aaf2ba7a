//! Run reporting: per-set verdict listings and the end-of-run summary.
//!
//! Resolved sets are logged at info level. Undecided sets are logged at
//! warn level under an `UNDECIDED` header so they can be found and re-run
//! with adjusted patterns.
//!
//! [`RunSummary`] serializes to JSON for `--json`:
//!
//! ```json
//! {
//!   "roots_scanned": 2,
//!   "total_files": 120,
//!   "total_size": 1048576,
//!   "hashed_files": 14,
//!   "duplicate_sets": 5,
//!   "resolved_sets": 4,
//!   "undecided_sets": 1,
//!   "deleted_files": 6,
//!   "would_delete_files": 0,
//!   "failed_deletes": 0,
//!   "skipped_deletes": 0,
//!   "bytes_freed": 51200,
//!   "scan_errors": 1,
//!   "dry_run": false,
//!   "interrupted": false,
//!   "duration_ms": 412
//! }
//! ```

use std::fmt::Write as _;

use bytesize::ByteSize;
use serde::Serialize;

use crate::actions::ExecutionReport;
use crate::duplicates::ScanSummary;
use crate::resolver::{Action, Verdict};
use crate::scanner::hash_to_hex;

/// Characters of the digest shown in set headers.
const SHORT_DIGEST: usize = 12;

fn short_digest(verdict: &Verdict) -> String {
    let mut hex = hash_to_hex(verdict.digest());
    hex.truncate(SHORT_DIGEST);
    hex
}

/// Render a verdict as a header line plus one line per member.
#[must_use]
pub fn describe_verdict(verdict: &Verdict) -> String {
    let mut out = String::new();
    let count = verdict.decisions().len();
    let size = ByteSize(verdict.size());

    if verdict.is_undecided() {
        let _ = write!(
            out,
            "UNDECIDED set {} ({} files, {} each): {}",
            short_digest(verdict),
            count,
            size,
            verdict.outcome()
        );
    } else {
        let _ = write!(
            out,
            "Set {} ({} files, {} each)",
            short_digest(verdict),
            count,
            size
        );
    }

    for decision in verdict.decisions() {
        let label = match decision.action {
            Action::Delete => "delete",
            Action::Keep => "keep",
            Action::Undecided => "?",
        };
        let _ = write!(
            out,
            "\n  {:<6} {} ({})",
            label,
            decision.path.display(),
            decision.reason
        );
    }
    out
}

/// Log a verdict, distinguishing undecided sets.
pub fn log_verdict(verdict: &Verdict) {
    if verdict.is_undecided() {
        log::warn!("{}", describe_verdict(verdict));
    } else {
        log::info!("{}", describe_verdict(verdict));
    }
}

/// Totals for one run.
#[derive(Debug, Default, Clone, Serialize, PartialEq, Eq)]
pub struct RunSummary {
    /// Roots actually walked
    pub roots_scanned: usize,
    /// Regular files considered
    pub total_files: usize,
    /// Bytes across those files
    pub total_size: u64,
    /// Files fingerprinted
    pub hashed_files: usize,
    /// Confirmed duplicate sets
    pub duplicate_sets: usize,
    /// Sets fully resolved
    pub resolved_sets: usize,
    /// Sets with at least one undecided member
    pub undecided_sets: usize,
    /// Files removed
    pub deleted_files: usize,
    /// Files a dry run would remove
    pub would_delete_files: usize,
    /// Removals that failed
    pub failed_deletes: usize,
    /// Removals skipped after an interrupt
    pub skipped_deletes: usize,
    /// Bytes freed, or that would be freed
    pub bytes_freed: u64,
    /// Files skipped during the scan
    pub scan_errors: usize,
    /// Whether this was a dry run
    pub dry_run: bool,
    /// Whether an interrupt cut the run short
    pub interrupted: bool,
    /// Wall time of the scan
    pub duration_ms: u64,
}

impl RunSummary {
    /// Assemble the summary from the scan, the verdicts, and the executor.
    #[must_use]
    pub fn new(
        scan: &ScanSummary,
        verdicts: &[Verdict],
        execution: &ExecutionReport,
        dry_run: bool,
    ) -> Self {
        let undecided_sets = verdicts.iter().filter(|v| v.is_undecided()).count();
        Self {
            roots_scanned: scan.roots_scanned,
            total_files: scan.total_files,
            total_size: scan.total_size,
            hashed_files: scan.hashed_files,
            duplicate_sets: scan.duplicate_sets,
            resolved_sets: verdicts.len() - undecided_sets,
            undecided_sets,
            deleted_files: execution.deleted_count(),
            would_delete_files: execution.would_delete_count(),
            failed_deletes: execution.failure_count(),
            skipped_deletes: execution.skipped_count(),
            bytes_freed: execution.bytes_freed(),
            scan_errors: scan.scan_errors.len(),
            dry_run,
            interrupted: execution.interrupted,
            duration_ms: u64::try_from(scan.scan_duration.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Whether any file was skipped because of an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.scan_errors > 0 || self.failed_deletes > 0
    }

    /// Human-readable multi-line summary.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = format!(
            "Scanned {} file(s) ({}) in {} folder(s); {} hashed",
            self.total_files,
            ByteSize(self.total_size),
            self.roots_scanned,
            self.hashed_files
        );
        let _ = write!(
            out,
            "\n{} duplicate set(s): {} resolved, {} undecided",
            self.duplicate_sets, self.resolved_sets, self.undecided_sets
        );
        if self.dry_run {
            let _ = write!(
                out,
                "\nDry run: would delete {} file(s), freeing {}",
                self.would_delete_files,
                ByteSize(self.bytes_freed)
            );
        } else {
            let _ = write!(
                out,
                "\nDeleted {} file(s), freed {}",
                self.deleted_files,
                ByteSize(self.bytes_freed)
            );
        }
        if self.has_errors() {
            let _ = write!(
                out,
                "\n{} scan error(s), {} failed deletion(s)",
                self.scan_errors, self.failed_deletes
            );
        }
        if self.interrupted {
            let _ = write!(out, "\nInterrupted: {} deletion(s) skipped", self.skipped_deletes);
        }
        out
    }

    /// Serialize as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
