//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based bucketing (Phase 1)
//! - Content fingerprint grouping (Phase 2)
//! - The [`DuplicateFinder`] pipeline over one or more roots

pub mod finder;
pub mod groups;

pub use finder::{
    group_duplicates, DuplicateFinder, FinderConfig, FinderError, GroupConfig, GroupStats,
    ScanSummary,
};
pub use groups::{bucket_by_size, BucketStats, DuplicateSet, SizeBucket};
