//! Directory walker built on walkdir.
//!
//! # Overview
//!
//! The [`Walker`] recursively enumerates regular files below a root in the
//! filesystem's normal traversal order. A subdirectory that cannot be read
//! is reported as a [`WalkError`] and its subtree skipped; iteration goes on.
//!
//! # Example
//!
//! ```no_run
//! use refdup::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Photos"), WalkerConfig::default());
//! let paths: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//! println!("Found {} files", paths.len());
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use walkdir::WalkDir;

use super::{WalkError, WalkerConfig};

/// Recursive file enumerator for one root.
#[derive(Debug)]
pub struct Walker {
    root: PathBuf,
    config: WalkerConfig,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker for the given root.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            shutdown_flag: None,
        }
    }

    /// Stop iteration as soon as the flag is set.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Walk the tree, yielding candidate file paths.
    ///
    /// Directories are never yielded. Symlinks are skipped unless
    /// `follow_symlinks` is set, in which case their targets are
    /// classified instead.
    pub fn walk(&self) -> impl Iterator<Item = Result<PathBuf, WalkError>> + '_ {
        WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .into_iter()
            .take_while(move |_| {
                if self.is_shutdown_requested() {
                    log::debug!("Walker: Shutdown requested, stopping iteration");
                    false
                } else {
                    true
                }
            })
            .filter_map(move |entry| match entry {
                Ok(entry) => {
                    let file_type = entry.file_type();
                    if file_type.is_symlink() {
                        log::trace!("Skipping symlink: {}", entry.path().display());
                        return None;
                    }
                    if !file_type.is_file() {
                        return None;
                    }
                    Some(Ok(entry.into_path()))
                }
                Err(e) => Some(Err(self.handle_walk_error(e))),
            })
    }

    fn handle_walk_error(&self, error: walkdir::Error) -> WalkError {
        let path = error
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);

        let err = match error.io_error().map(std::io::Error::kind) {
            Some(std::io::ErrorKind::PermissionDenied) => WalkError::PermissionDenied(path),
            Some(std::io::ErrorKind::NotFound) => WalkError::NotFound(path),
            _ => WalkError::Other {
                path,
                message: error.to_string(),
            },
        };
        log::warn!("Skipping subtree: {}", err);
        err
    }
}
