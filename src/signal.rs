//! Ctrl+C handling.
//!
//! An interrupt sets a shared [`AtomicBool`]. The walker and hasher stop
//! picking up new files, and the executor stops issuing new deletions.
//! A removal already in progress is allowed to finish.
//!
//! ```rust,no_run
//! use refdup::signal::install_handler;
//! use refdup::duplicates::FinderConfig;
//!
//! let handler = install_handler().expect("signal handler");
//! let config = FinderConfig::default().with_shutdown_flag(handler.flag());
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Shared interrupt flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    /// A handler with no shutdown requested.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an interrupt arrived (or [`request_shutdown`] was called).
    ///
    /// [`request_shutdown`]: Self::request_shutdown
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Raise the flag by hand.
    pub fn request_shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// The flag to hand to the finder and executor.
    #[must_use]
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    /// Lower the flag again.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Error type for signal handler installation.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// ctrlc refused the handler.
    #[error("Failed to install signal handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

static GLOBAL_HANDLER: OnceLock<ShutdownHandler> = OnceLock::new();

/// Install the process-wide Ctrl+C handler.
///
/// ctrlc accepts one handler per process. Later calls (several runs in one
/// test binary, for instance) get the installed handler back with its flag
/// lowered.
///
/// # Errors
///
/// Returns [`SignalError::InstallFailed`] if ctrlc rejects the handler for
/// a reason other than one already being registered.
pub fn install_handler() -> Result<ShutdownHandler, SignalError> {
    if let Some(handler) = GLOBAL_HANDLER.get() {
        handler.reset();
        return Ok(handler.clone());
    }

    let handler = ShutdownHandler::new();
    let flag = handler.flag();

    let installed = ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
        let mut stderr = std::io::stderr();
        let _ = writeln!(stderr, "\nInterrupted. No further files will be deleted.");
        let _ = stderr.flush();
        log::info!("Shutdown signal received");
    });

    match installed {
        Ok(()) => {
            let _ = GLOBAL_HANDLER.set(handler.clone());
            Ok(GLOBAL_HANDLER.get().cloned().unwrap_or(handler))
        }
        Err(ctrlc::Error::MultipleHandlers) => {
            log::debug!("Ctrl+C handler already registered, using unhooked handler");
            let fallback = GLOBAL_HANDLER.get_or_init(ShutdownHandler::new);
            fallback.reset();
            Ok(fallback.clone())
        }
        Err(e) => Err(SignalError::InstallFailed(e)),
    }
}
