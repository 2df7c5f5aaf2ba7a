//! Size bucketing and duplicate set types.
//!
//! # Overview
//!
//! Size bucketing is the cheap first phase of duplicate detection: files
//! with different byte sizes cannot be duplicates, so only buckets with two
//! or more members are worth hashing.
//!
//! # Example
//!
//! ```no_run
//! use refdup::duplicates::bucket_by_size;
//! use std::path::PathBuf;
//!
//! let paths = vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")];
//! let (buckets, stats) = bucket_by_size(paths, Some(1024));
//!
//! println!("{} buckets, {} candidates", buckets.len(), stats.potential_duplicates);
//! ```

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::scanner::{hash_to_hex, Digest, FileRecord, StatError};

/// Files sharing one exact byte size, in enumeration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeBucket {
    /// File size in bytes (shared by all files in this bucket)
    pub size: u64,
    /// Files with this exact size
    pub files: Vec<FileRecord>,
}

impl SizeBucket {
    /// Create a bucket with initial files.
    #[must_use]
    pub fn with_files(size: u64, files: Vec<FileRecord>) -> Self {
        Self { size, files }
    }

    /// Number of files in this bucket.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this bucket is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Check if this bucket can hold duplicates (2+ files).
    #[must_use]
    pub fn has_candidates(&self) -> bool {
        self.files.len() > 1
    }
}

/// Byte-identical files sharing size and content digest.
///
/// Never holds fewer than two members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateSet {
    digest: Digest,
    size: u64,
    members: Vec<FileRecord>,
}

impl DuplicateSet {
    /// Build a set, or `None` when fewer than two members are given.
    #[must_use]
    pub fn new(digest: Digest, size: u64, members: Vec<FileRecord>) -> Option<Self> {
        if members.len() < 2 {
            return None;
        }
        Some(Self {
            digest,
            size,
            members,
        })
    }

    /// Content digest shared by every member.
    #[must_use]
    pub fn digest(&self) -> &Digest {
        &self.digest
    }

    /// Digest as hexadecimal string.
    #[must_use]
    pub fn digest_hex(&self) -> String {
        hash_to_hex(&self.digest)
    }

    /// Byte size of each member.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Members in set order.
    #[must_use]
    pub fn members(&self) -> &[FileRecord] {
        &self.members
    }

    /// Number of members (always 2 or more).
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always false; present for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether `path` is a member.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.members.iter().any(|m| m.path == path)
    }

    /// Space freed if all copies but one were removed.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * (self.members.len() as u64 - 1)
    }

    /// Reorder members by creation time, oldest first.
    ///
    /// The sort is stable, so members with equal timestamps keep their
    /// enumeration order.
    pub fn sort_by_age(&mut self) {
        self.members.sort_by_key(|m| m.created);
    }
}

/// Statistics from the size bucketing phase.
#[derive(Debug, Default)]
pub struct BucketStats {
    /// Paths offered to the bucketer
    pub total_paths: usize,
    /// Files stat-ed successfully
    pub stat_files: usize,
    /// Paths reached twice through overlapping roots
    pub duplicate_paths: usize,
    /// Files below the minimum size threshold
    pub below_min_size: usize,
    /// Files whose size no other file shares
    pub eliminated_unique: usize,
    /// Files left in buckets of 2+
    pub potential_duplicates: usize,
    /// Total bytes of all stat-ed files
    pub total_size: u64,
    /// Stat failures, skipped
    pub errors: Vec<StatError>,
}

impl BucketStats {
    /// Percentage of stat-ed files eliminated by size comparison.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.stat_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.stat_files as f64) * 100.0
        }
    }
}

/// Stat every path and group the survivors by exact size.
///
/// Files smaller than `min_size` are excluded entirely. A file reached
/// through two roots is kept once, under the first path seen. Buckets
/// holding a single file are dropped. Buckets come back in ascending size
/// order with members in input order, so the output is deterministic for a
/// given input sequence.
pub fn bucket_by_size(
    paths: impl IntoIterator<Item = PathBuf>,
    min_size: Option<u64>,
) -> (Vec<SizeBucket>, BucketStats) {
    let mut stats = BucketStats::default();
    let mut by_size: BTreeMap<u64, Vec<FileRecord>> = BTreeMap::new();
    let mut seen: HashSet<PathBuf> = HashSet::new();

    for path in paths {
        stats.total_paths += 1;

        let metadata = match fs::metadata(&path) {
            Ok(m) => m,
            Err(e) => {
                let err = StatError::from_io(path, e);
                log::warn!("Skipping file, stat failed: {}", err);
                stats.errors.push(err);
                continue;
            }
        };

        let canonical = fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
        if !seen.insert(canonical) {
            log::debug!("Already enumerated via another root: {}", path.display());
            stats.duplicate_paths += 1;
            continue;
        }

        stats.stat_files += 1;
        stats.total_size += metadata.len();

        if min_size.is_some_and(|min| metadata.len() < min) {
            log::trace!(
                "Excluded below minimum size ({} bytes): {}",
                metadata.len(),
                path.display()
            );
            stats.below_min_size += 1;
            continue;
        }

        let record = FileRecord::from_metadata(path, &metadata);
        by_size.entry(record.size).or_default().push(record);
    }

    let buckets: Vec<SizeBucket> = by_size
        .into_iter()
        .filter_map(|(size, files)| {
            if files.len() == 1 {
                stats.eliminated_unique += 1;
                log::trace!("Eliminated unique size {}: {}", size, files[0].path.display());
                None
            } else {
                stats.potential_duplicates += files.len();
                log::debug!("Size bucket {} bytes: {} candidates", size, files.len());
                Some(SizeBucket::with_files(size, files))
            }
        })
        .collect();

    log::info!(
        "Size bucketing complete: {} files -> {} candidates ({:.1}% eliminated)",
        stats.stat_files,
        stats.potential_duplicates,
        stats.elimination_rate()
    );

    (buckets, stats)
}
