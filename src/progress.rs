//! Progress reporting utilities using indicatif.
//!
//! The pipeline reports through the [`ProgressCallback`] trait so the
//! library never depends on a terminal. [`Progress`] is the indicatif-backed
//! implementation used by the binary.

use std::sync::Mutex;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Phase name used while enumerating roots.
pub const PHASE_WALKING: &str = "walking";
/// Phase name used while fingerprinting candidates.
pub const PHASE_HASHING: &str = "hashing";

/// Progress callback for the scanning phases.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase ([`PHASE_WALKING`] or [`PHASE_HASHING`])
    /// * `total` - Total number of items to process, 0 if unknown
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called for each item processed.
    ///
    /// # Arguments
    ///
    /// * `current` - Number of items processed so far
    /// * `path` - Path being processed
    fn on_progress(&self, current: usize, path: &str);

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);

    /// Called to update the progress message.
    fn on_message(&self, _message: &str) {}
}

/// Progress reporter using indicatif.
pub struct Progress {
    multi: MultiProgress,
    walking: Mutex<Option<ProgressBar>>,
    hashing: Mutex<Option<ProgressBar>>,
    hidden: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `hidden` - If true, no progress bars will be displayed.
    ///
    /// # Examples
    ///
    /// ```
    /// use refdup::progress::Progress;
    ///
    /// let progress = Progress::new(true);
    /// ```
    #[must_use]
    pub fn new(hidden: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            walking: Mutex::new(None),
            hashing: Mutex::new(None),
            hidden,
        }
    }

    fn walking_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} files")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn hashing_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    fn slot(&self, phase: &str) -> Option<&Mutex<Option<ProgressBar>>> {
        match phase {
            PHASE_WALKING => Some(&self.walking),
            PHASE_HASHING => Some(&self.hashing),
            _ => None,
        }
    }

    /// The bar of the latest phase still running.
    fn active_bar(&self) -> Option<ProgressBar> {
        for slot in [&self.hashing, &self.walking] {
            if let Ok(guard) = slot.lock() {
                if let Some(pb) = guard.as_ref() {
                    return Some(pb.clone());
                }
            }
        }
        None
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.hidden {
            return;
        }

        let pb = match phase {
            PHASE_WALKING => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::walking_style());
                pb.set_message("Walking directories");
                pb.enable_steady_tick(Duration::from_millis(100));
                pb
            }
            _ => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::hashing_style());
                pb.set_message("Hashing");
                pb
            }
        };

        if let Some(slot) = self.slot(phase) {
            if let Ok(mut guard) = slot.lock() {
                *guard = Some(pb);
            }
        }
    }

    fn on_progress(&self, current: usize, path: &str) {
        if self.hidden {
            return;
        }
        if let Some(pb) = self.active_bar() {
            pb.set_position(current as u64);
            pb.set_message(truncate_path(path, 30));
        }
    }

    fn on_phase_end(&self, phase: &str) {
        if self.hidden {
            return;
        }
        if let Some(slot) = self.slot(phase) {
            if let Some(pb) = slot.lock().ok().and_then(|mut g| g.take()) {
                pb.finish_and_clear();
            }
        }
    }

    fn on_message(&self, message: &str) {
        if self.hidden {
            return;
        }
        if let Some(pb) = self.active_bar() {
            pb.set_message(message.to_string());
        }
    }
}

/// Truncate a path for display in the progress bar.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_string();
    }

    let file_name = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let name_len = file_name.chars().count();
    if name_len >= max_len {
        let tail: String = file_name.chars().skip(name_len - (max_len - 3)).collect();
        return format!("...{}", tail);
    }

    format!(".../{}", file_name)
}
