//! Layered application configuration.
//!
//! Precedence, lowest first:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. TOML file: `--config PATH`, or `config.toml` in the platform config
//!    directory when present
//! 3. Environment variables prefixed `REFDUP_` (e.g. `REFDUP_IO_THREADS=8`)
//! 4. Command-line flags ([`Config::apply_cli`])
//!
//! Pattern lists from every layer are concatenated rather than replaced,
//! so patterns in the file are applied before those given on the command
//! line.
//!
//! ```toml
//! io_threads = 8
//! min_size = 4096
//! follow_symlinks = false
//! delete = ['\(1\)']
//! keep = ['^/home/me/Pictures/']
//! progress = true
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::cli::Cli;

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "REFDUP_";

/// Effective configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hashing threads.
    pub io_threads: usize,
    /// Exclude files below this many bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_size: Option<u64>,
    /// Follow symbolic links while walking.
    pub follow_symlinks: bool,
    /// Extra delete patterns.
    pub delete: Vec<String>,
    /// Keep patterns.
    pub keep: Vec<String>,
    /// Show progress bars.
    pub progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            io_threads: 4,
            min_size: None,
            follow_symlinks: false,
            delete: Vec::new(),
            keep: Vec::new(),
            progress: true,
        }
    }
}

impl Config {
    /// Default configuration file location, if the platform has one.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "refdup").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Figment over defaults, `file` (if any), and the environment.
    #[must_use]
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = file {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load defaults, a config file, and the environment.
    ///
    /// An explicit path must exist. The platform default path is used only
    /// when present.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit file is missing, or if any layer
    /// fails to parse.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let file = match explicit {
            Some(path) => {
                if !path.is_file() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                Some(path.to_path_buf())
            }
            None => Self::default_path().filter(|p| p.is_file()),
        };

        if let Some(ref path) = file {
            log::debug!("Loading config from {}", path.display());
        }

        let config: Self = Self::figment(file.as_deref())
            .extract()
            .context("Invalid configuration")?;
        Ok(config)
    }

    /// Overlay command-line flags.
    ///
    /// Scalar flags replace file values when given. Pattern lists append.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(threads) = cli.io_threads {
            self.io_threads = threads;
        }
        if cli.min_size.is_some() {
            self.min_size = cli.min_size;
        }
        self.follow_symlinks |= cli.follow_symlinks;
        self.delete.extend(cli.delete_patterns.iter().cloned());
        self.keep.extend(cli.keep_patterns.iter().cloned());
        if cli.no_progress {
            self.progress = false;
        }
        self.io_threads = self.io_threads.max(1);
    }

    /// Render as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}
