//! Duplicate finder with two-phase detection.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection pipeline:
//! 1. **Enumerate** - Walk every root (see [`crate::scanner::Walker`])
//! 2. **Phase 1 - Size bucketing**: Group files by exact size (see
//!    [`crate::duplicates::groups`])
//! 3. **Phase 2 - Fingerprint grouping**: Hash same-size files and cluster
//!    equal digests into [`DuplicateSet`]s
//!
//! Hashing only ever touches files that share a size with another file.
//!
//! # Example
//!
//! ```no_run
//! use refdup::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::PathBuf;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(4));
//! let (sets, summary) = finder.find_duplicates(&[PathBuf::from(".")]).unwrap();
//!
//! println!("Found {} duplicate sets", sets.len());
//! println!("Reclaimable space: {}", summary.reclaimable_display());
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use super::groups::{bucket_by_size, DuplicateSet, SizeBucket};
use crate::progress::{ProgressCallback, PHASE_HASHING, PHASE_WALKING};
use crate::scanner::{Digest, FileRecord, Hasher, ReadError, ScanError, Walker, WalkerConfig};

/// Configuration for the fingerprint grouping phase.
#[derive(Clone)]
pub struct GroupConfig {
    /// Number of I/O threads for parallel hashing.
    pub io_threads: usize,
    /// Sort members oldest first (needed when an age preference is active).
    pub order_by_age: bool,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for GroupConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupConfig")
            .field("io_threads", &self.io_threads)
            .field("order_by_age", &self.order_by_age)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            io_threads: 4,
            order_by_age: false,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl GroupConfig {
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Statistics from the fingerprint grouping phase.
#[derive(Debug, Default)]
pub struct GroupStats {
    /// Files that entered the phase
    pub input_files: usize,
    /// Files hashed successfully
    pub hashed_files: usize,
    /// Total bytes hashed
    pub bytes_hashed: u64,
    /// Read failures, skipped
    pub errors: Vec<ReadError>,
    /// Confirmed duplicate sets
    pub duplicate_sets: usize,
    /// Files in confirmed sets beyond one copy each
    pub duplicate_files: usize,
    /// Bytes freed if every set kept a single copy
    pub wasted_space: u64,
    /// Whether the phase was cut short by shutdown
    pub interrupted: bool,
}

/// Hash every candidate and emit one [`DuplicateSet`] per shared digest.
///
/// Buckets are processed in the given order and sets within a bucket in
/// order of their first member, so output is deterministic for a given
/// input. Members keep bucket order unless `order_by_age` is set, in which
/// case they are sorted oldest first (stable on ties).
///
/// Unreadable files are logged, recorded in the stats, and left out of
/// every set.
#[must_use]
pub fn group_duplicates(
    buckets: Vec<SizeBucket>,
    hasher: Arc<Hasher>,
    config: &GroupConfig,
) -> (Vec<DuplicateSet>, GroupStats) {
    let input_files: usize = buckets.iter().map(SizeBucket::len).sum();
    let mut stats = GroupStats {
        input_files,
        ..Default::default()
    };

    if input_files == 0 {
        log::debug!("Fingerprinting: No files to process");
        return (Vec::new(), stats);
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start(PHASE_HASHING, input_files);
    }
    log::info!("Fingerprinting {} candidate files", input_files);

    let candidates: Vec<(usize, FileRecord)> = buckets
        .into_iter()
        .enumerate()
        .flat_map(|(idx, bucket)| bucket.files.into_iter().map(move |f| (idx, f)))
        .collect();

    let done = AtomicUsize::new(0);
    let hash_all = || -> Vec<(usize, FileRecord, Option<Result<Digest, ReadError>>)> {
        candidates
            .into_par_iter()
            .map(|(idx, file)| {
                if config.is_shutdown_requested() {
                    return (idx, file, None);
                }
                let result = hasher.fingerprint(&file.path);
                if let Some(ref callback) = config.progress_callback {
                    let current = done.fetch_add(1, Ordering::Relaxed) + 1;
                    callback.on_progress(current, file.path.to_string_lossy().as_ref());
                }
                (idx, file, Some(result))
            })
            .collect()
    };

    let results = match rayon::ThreadPoolBuilder::new()
        .num_threads(config.io_threads.max(1))
        .build()
    {
        Ok(pool) => pool.install(hash_all),
        Err(e) => {
            log::warn!(
                "Failed to create hashing thread pool ({}), using global pool with {} threads",
                e,
                rayon::current_num_threads()
            );
            hash_all()
        }
    };

    // Indexed parallel collect keeps input order, so grouping below is
    // a sequential pass over bucket-ordered results.
    let mut sets = Vec::new();
    let mut current_bucket: Option<usize> = None;
    let mut by_digest: Vec<(Digest, Vec<FileRecord>)> = Vec::new();
    let mut index: HashMap<Digest, usize> = HashMap::new();

    for (bucket_idx, file, result) in results {
        if current_bucket != Some(bucket_idx) {
            flush_bucket(&mut by_digest, &mut index, &mut sets, config.order_by_age);
            current_bucket = Some(bucket_idx);
        }
        match result {
            None => stats.interrupted = true,
            Some(Ok(digest)) => {
                stats.hashed_files += 1;
                stats.bytes_hashed += file.size;
                match index.get(&digest).copied() {
                    Some(i) => by_digest[i].1.push(file),
                    None => {
                        index.insert(digest, by_digest.len());
                        by_digest.push((digest, vec![file]));
                    }
                }
            }
            Some(Err(ReadError::Interrupted(_))) => stats.interrupted = true,
            Some(Err(e)) => {
                log::warn!("Skipping file, read failed: {}", e);
                stats.errors.push(e);
            }
        }
    }
    flush_bucket(&mut by_digest, &mut index, &mut sets, config.order_by_age);

    if stats.interrupted || config.is_shutdown_requested() {
        stats.interrupted = true;
        log::info!("Fingerprinting: Interrupted by shutdown signal");
    }

    stats.duplicate_sets = sets.len();
    stats.duplicate_files = sets.iter().map(|s| s.len() - 1).sum();
    stats.wasted_space = sets.iter().map(DuplicateSet::wasted_space).sum();

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end(PHASE_HASHING);
    }

    log::info!(
        "Fingerprinting complete: {} sets, {} redundant copies, {} bytes reclaimable",
        stats.duplicate_sets,
        stats.duplicate_files,
        stats.wasted_space
    );

    (sets, stats)
}

/// Turn one bucket's digest groups into sets and reset the accumulators.
fn flush_bucket(
    by_digest: &mut Vec<(Digest, Vec<FileRecord>)>,
    index: &mut HashMap<Digest, usize>,
    sets: &mut Vec<DuplicateSet>,
    order_by_age: bool,
) {
    index.clear();
    for (digest, files) in by_digest.drain(..) {
        let size = files.first().map_or(0, |f| f.size);
        if let Some(mut set) = DuplicateSet::new(digest, size, files) {
            if order_by_age {
                set.sort_by_age();
            }
            log::debug!(
                "Duplicate set {}: {} files, {} bytes each",
                set.digest_hex(),
                set.len(),
                size
            );
            sets.push(set);
        }
    }
}

// ============================================================================
// DuplicateFinder - Pipeline Orchestrator
// ============================================================================

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of I/O threads for parallel hashing.
    pub io_threads: usize,
    /// Exclude files smaller than this many bytes.
    pub min_size: Option<u64>,
    /// Sort set members oldest first.
    pub order_by_age: bool,
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("io_threads", &self.io_threads)
            .field("min_size", &self.min_size)
            .field("order_by_age", &self.order_by_age)
            .field("walker_config", &self.walker_config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            io_threads: 4,
            min_size: None,
            order_by_age: false,
            walker_config: WalkerConfig::default(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the I/O thread count (at least 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the minimum size threshold.
    #[must_use]
    pub fn with_min_size(mut self, min_size: Option<u64>) -> Self {
        self.min_size = min_size;
        self
    }

    /// Sort set members by creation time.
    #[must_use]
    pub fn with_order_by_age(mut self, enabled: bool) -> Self {
        self.order_by_age = enabled;
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Roots actually walked
    pub roots_scanned: usize,
    /// Regular files stat-ed across all roots
    pub total_files: usize,
    /// Total size of those files in bytes
    pub total_size: u64,
    /// Files excluded by the minimum size threshold
    pub below_min_size: usize,
    /// Files eliminated because no other file had their size
    pub eliminated_by_size: usize,
    /// Files fingerprinted
    pub hashed_files: usize,
    /// Confirmed duplicate sets
    pub duplicate_sets: usize,
    /// Redundant copies across all sets
    pub duplicate_files: usize,
    /// Space freed if every set kept one copy
    pub reclaimable_space: u64,
    /// Duration of the scan
    pub scan_duration: std::time::Duration,
    /// Per-file errors, each skipped
    pub scan_errors: Vec<ScanError>,
}

impl ScanSummary {
    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        bytesize::ByteSize::b(self.reclaimable_space).to_string()
    }

    /// Format total size as human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        bytesize::ByteSize::b(self.total_size).to_string()
    }
}

/// Errors that end a scan.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// None of the given roots is an existing directory.
    #[error("No valid folder to scan (checked {0} path(s))")]
    NoValidRoots(usize),
}

/// Runs enumeration, size bucketing, and fingerprint grouping over a set
/// of roots.
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Arc<Hasher>,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let mut hasher = Hasher::new();
        if let Some(ref flag) = config.shutdown_flag {
            hasher = hasher.with_shutdown_flag(flag.clone());
        }
        Self {
            config,
            hasher: Arc::new(hasher),
        }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Find all duplicate sets below the given roots.
    ///
    /// Roots that do not exist or are not directories are logged and
    /// skipped. Per-file failures land in [`ScanSummary::scan_errors`].
    ///
    /// # Errors
    ///
    /// - [`FinderError::NoValidRoots`] if no root is a usable directory
    /// - [`FinderError::Interrupted`] if shutdown is requested mid-scan
    pub fn find_duplicates(
        &self,
        roots: &[PathBuf],
    ) -> Result<(Vec<DuplicateSet>, ScanSummary), FinderError> {
        let start_time = std::time::Instant::now();
        let mut summary = ScanSummary::default();

        let valid_roots: Vec<&Path> = roots
            .iter()
            .map(PathBuf::as_path)
            .filter(|root| {
                if root.is_dir() {
                    true
                } else if root.exists() {
                    log::warn!("Not a directory, skipping: {}", root.display());
                    false
                } else {
                    log::warn!("Path not found, skipping: {}", root.display());
                    false
                }
            })
            .collect();

        if valid_roots.is_empty() {
            return Err(FinderError::NoValidRoots(roots.len()));
        }
        summary.roots_scanned = valid_roots.len();

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        // Enumerate
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start(PHASE_WALKING, 0);
        }

        let mut paths = Vec::new();
        for root in &valid_roots {
            log::info!("Scanning {}", root.display());
            let mut walker = Walker::new(root, self.config.walker_config.clone());
            if let Some(ref flag) = self.config.shutdown_flag {
                walker = walker.with_shutdown_flag(flag.clone());
            }
            for result in walker.walk() {
                match result {
                    Ok(path) => {
                        if let Some(ref callback) = self.config.progress_callback {
                            callback.on_progress(paths.len() + 1, path.to_string_lossy().as_ref());
                        }
                        paths.push(path);
                    }
                    Err(e) => summary.scan_errors.push(ScanError::Walk(e)),
                }
            }
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(PHASE_WALKING);
        }

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        // Phase 1: Size bucketing
        let (buckets, bucket_stats) = bucket_by_size(paths, self.config.min_size);
        summary.total_files = bucket_stats.stat_files;
        summary.total_size = bucket_stats.total_size;
        summary.below_min_size = bucket_stats.below_min_size;
        summary.eliminated_by_size = bucket_stats.eliminated_unique;
        summary
            .scan_errors
            .extend(bucket_stats.errors.into_iter().map(ScanError::Stat));

        log::info!(
            "Found {} files ({} total)",
            summary.total_files,
            summary.total_size_display()
        );

        if buckets.is_empty() {
            log::info!("No potential duplicates found after size bucketing");
            summary.scan_duration = start_time.elapsed();
            return Ok((Vec::new(), summary));
        }

        // Phase 2: Fingerprint grouping
        let group_config = GroupConfig {
            io_threads: self.config.io_threads,
            order_by_age: self.config.order_by_age,
            shutdown_flag: self.config.shutdown_flag.clone(),
            progress_callback: self.config.progress_callback.clone(),
        };
        let (sets, group_stats) = group_duplicates(buckets, self.hasher.clone(), &group_config);

        if group_stats.interrupted {
            return Err(FinderError::Interrupted);
        }

        summary.hashed_files = group_stats.hashed_files;
        summary.duplicate_sets = group_stats.duplicate_sets;
        summary.duplicate_files = group_stats.duplicate_files;
        summary.reclaimable_space = group_stats.wasted_space;
        summary
            .scan_errors
            .extend(group_stats.errors.into_iter().map(ScanError::Read));
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} duplicate sets, {} redundant files, {} reclaimable",
            summary.duplicate_sets,
            summary.duplicate_files,
            summary.reclaimable_display()
        );

        Ok((sets, summary))
    }
}
