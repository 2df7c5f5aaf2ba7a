//! BLAKE3 file fingerprinting with block streaming.
//!
//! # Overview
//!
//! The [`Hasher`] reads a file in fixed [`BLOCK_SIZE`] chunks and feeds them
//! through BLAKE3, so memory use stays constant whatever the file size.
//! A read failure at any point yields a [`ReadError`] for that file only.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::ReadError;

/// Size of each block read from disk.
pub const BLOCK_SIZE: usize = 4096;

/// A 32-byte BLAKE3 content digest.
pub type Digest = [u8; 32];

/// Streaming content hasher.
#[derive(Debug, Clone, Default)]
pub struct Hasher {
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Hasher {
    /// Create a new hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort in-progress reads once the flag is set.
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

    /// Compute the content digest of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError`] if the file cannot be opened, a read fails
    /// mid-stream, or shutdown is requested while reading.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use refdup::scanner::{hash_to_hex, Hasher};
    /// use std::path::Path;
    ///
    /// let digest = Hasher::new().fingerprint(Path::new("file.bin")).unwrap();
    /// println!("{}", hash_to_hex(&digest));
    /// ```
    pub fn fingerprint(&self, path: &Path) -> Result<Digest, ReadError> {
        let mut file =
            File::open(path).map_err(|e| ReadError::from_io(path.to_path_buf(), e))?;
        let mut hasher = blake3::Hasher::new();
        let mut buffer = [0u8; BLOCK_SIZE];

        loop {
            if self.is_shutdown_requested() {
                return Err(ReadError::Interrupted(path.to_path_buf()));
            }
            let read = match file.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(ReadError::from_io(path.to_path_buf(), e)),
            };
            hasher.update(&buffer[..read]);
        }

        Ok(*hasher.finalize().as_bytes())
    }
}

/// Render a digest as lowercase hex.
#[must_use]
pub fn hash_to_hex(hash: &Digest) -> String {
    blake3::Hash::from(*hash).to_hex().to_string()
}
