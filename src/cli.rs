//! Command-line interface definitions for refdup.
//!
//! A single flat command: one or more folders plus retention options.
//! Values left unset here fall back to the config file and environment
//! (see [`crate::config`]).
//!
//! # Example
//!
//! ```bash
//! # Preview what would be removed under two folders
//! refdup --dry-run ~/Pictures /mnt/backup/Pictures
//!
//! # Keep whatever lives under ~/Pictures, drop "(1)" copies, ignore small files
//! refdup --keep '^/home/me/Pictures/' --delete '\(1\)' --min-size 1MB ~/Pictures /mnt/backup
//!
//! # No pattern applies: keep the oldest copy of each set
//! refdup --keep-oldest ~/Downloads
//! ```

use clap::Parser;
use std::path::PathBuf;

/// Find byte-identical duplicate files and remove redundant copies.
///
/// Files are grouped by size, then by BLAKE3 content digest. Within each
/// set of identical files, delete and keep patterns (regular expressions
/// searched in the full path) decide which copies go. Built-in delete
/// patterns match "copy"/"copie" (any case) and a trailing "~".
#[derive(Debug, Parser)]
#[command(name = "refdup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Folders to scan (at least one)
    #[arg(value_name = "FOLDER", required_unless_present = "print_config", num_args = 1..)]
    pub folders: Vec<PathBuf>,

    /// Report intended deletions without removing any file
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Exclude files smaller than this (e.g., 100, 4KiB, 1MB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub min_size: Option<u64>,

    /// When no pattern matches a set, keep its oldest member
    #[arg(long, conflicts_with = "keep_newest")]
    pub keep_oldest: bool,

    /// When no pattern matches a set, keep its newest member
    #[arg(long)]
    pub keep_newest: bool,

    /// Extra delete patterns, appended after the built-in ones
    #[arg(long = "delete", value_name = "REGEX", num_args = 0..)]
    pub delete_patterns: Vec<String>,

    /// Keep patterns: among non-deleted members, matching files survive
    #[arg(long = "keep", value_name = "REGEX", num_args = 0..)]
    pub keep_patterns: Vec<String>,

    /// Follow symbolic links while walking
    ///
    /// Warning: may visit the same file twice through different links;
    /// such aliases are collapsed by canonical path.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Number of I/O threads for hashing (default: 4)
    ///
    /// Lower values reduce disk thrashing on HDDs.
    #[arg(long, value_name = "N")]
    pub io_threads: Option<usize>,

    /// Configuration file (TOML); defaults to the platform config dir
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,

    /// Hide progress bars
    #[arg(long)]
    pub no_progress: bool,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Report fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
/// Case-insensitive. Numbers without suffix are treated as bytes.
///
/// # Examples
///
/// ```
/// use refdup::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("1KB").unwrap(), 1000);
/// assert_eq!(parse_size("1KiB").unwrap(), 1024);
/// assert_eq!(parse_size("1MiB").unwrap(), 1_048_576);
/// ```
///
/// # Errors
///
/// Returns an error if the string is empty, contains an invalid number,
/// a negative number, or an unknown size suffix.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    if num < 0.0 {
        return Err("Size cannot be negative".to_string());
    }

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        "TB" | "T" => 1_000_000_000_000,
        "TIB" => 1_099_511_627_776,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    Ok((num * multiplier as f64) as u64)
}
