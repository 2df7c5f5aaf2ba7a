//! Scanner module for directory enumeration and content fingerprinting.
//!
//! This module provides functionality for:
//! - Recursive directory enumeration using walkdir
//! - Streaming content hashing with BLAKE3
//! - The per-file error taxonomy used by the rest of the pipeline
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and candidate path discovery
//! - [`hasher`]: Block-streamed file fingerprinting
//!
//! Every error defined here is per-file and non-fatal: callers log it,
//! record it, and continue with the rest of the tree.
//!
//! # Example
//!
//! ```no_run
//! use refdup::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("."), WalkerConfig::default());
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(path) => println!("{}", path.display()),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod hasher;
pub mod walker;

use std::fs::Metadata;
use std::io;
use std::path::PathBuf;
use std::time::SystemTime;

pub use hasher::{hash_to_hex, Digest, Hasher, BLOCK_SIZE};
pub use walker::Walker;

/// An enumerated file candidate.
///
/// Immutable once built; the path is the unique key within a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Path to the file as enumerated
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Creation time, falling back to modification time where the
    /// filesystem does not record creation
    pub created: SystemTime,
}

impl FileRecord {
    /// Create a new FileRecord.
    #[must_use]
    pub fn new(path: PathBuf, size: u64, created: SystemTime) -> Self {
        Self {
            path,
            size,
            created,
        }
    }

    /// Build a record from already-fetched metadata.
    #[must_use]
    pub fn from_metadata(path: PathBuf, metadata: &Metadata) -> Self {
        let created = metadata
            .created()
            .or_else(|_| metadata.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        Self::new(path, metadata.len(), created)
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Follow symbolic links during traversal.
    /// Symlinked files are skipped when this is false.
    pub follow_symlinks: bool,
}

impl WalkerConfig {
    /// Create a new configuration.
    #[must_use]
    pub fn new(follow_symlinks: bool) -> Self {
        Self { follow_symlinks }
    }
}

/// A subtree could not be read during enumeration.
#[derive(thiserror::Error, Debug)]
pub enum WalkError {
    /// Permission was denied when reading a directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The root or an entry disappeared during traversal.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// Traversal failed for another reason (symlink loop, I/O error).
    #[error("Walk error for {path}: {message}")]
    Other {
        /// Path where the error occurred
        path: PathBuf,
        /// Description from the walker
        message: String,
    },
}

/// Size lookup failed for an enumerated path.
#[derive(thiserror::Error, Debug)]
pub enum StatError {
    /// The file vanished between enumeration and stat.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading metadata.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading metadata.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl StatError {
    /// Classify an I/O error raised while stat-ing `path`.
    #[must_use]
    pub fn from_io(path: PathBuf, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io {
                path,
                source: error,
            },
        }
    }
}

/// Fingerprinting failed to read a file fully.
#[derive(thiserror::Error, Debug)]
pub enum ReadError {
    /// The file was not found when opening it.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Hashing was abandoned because shutdown was requested.
    #[error("Read interrupted: {0}")]
    Interrupted(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl ReadError {
    /// Classify an I/O error raised while reading `path`.
    #[must_use]
    pub fn from_io(path: PathBuf, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io {
                path,
                source: error,
            },
        }
    }

    /// Path of the file that could not be read.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::NotFound(p) | Self::PermissionDenied(p) | Self::Interrupted(p) => p,
            Self::Io { path, .. } => path,
        }
    }
}

/// Any per-file error met while scanning, kept for the run summary.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// A subtree was skipped.
    #[error(transparent)]
    Walk(#[from] WalkError),

    /// A file could not be stat-ed.
    #[error(transparent)]
    Stat(#[from] StatError),

    /// A file could not be fingerprinted.
    #[error(transparent)]
    Read(#[from] ReadError),
}
