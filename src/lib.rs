//! refdup - rule-driven duplicate file remover
//!
//! Finds byte-identical files below one or more folders (size bucketing,
//! then streamed BLAKE3 fingerprints) and decides per duplicate set which
//! copies to delete using regex delete/keep rules and an optional
//! keep-oldest/keep-newest fallback. Sets no rule can settle are left
//! alone and reported as undecided.

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod progress;
pub mod report;
pub mod resolver;
pub mod scanner;
pub mod signal;

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::actions::{Executor, ExecutorConfig};
use crate::cli::Cli;
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, FinderConfig};
use crate::error::ExitCode;
use crate::progress::Progress;
use crate::report::RunSummary;
use crate::resolver::{AgePreference, RuleConfig};
use crate::scanner::WalkerConfig;

/// Build the immutable rule set from the merged configuration.
///
/// # Errors
///
/// Returns an error for conflicting age flags or an invalid pattern.
pub fn build_rules(config: &Config, cli: &Cli) -> Result<RuleConfig> {
    let age = AgePreference::from_flags(cli.keep_oldest, cli.keep_newest)?;
    let rules = RuleConfig::builder()
        .min_size(config.min_size)
        .delete_patterns(config.delete.iter().cloned())
        .keep_patterns(config.keep.iter().cloned())
        .age_preference(age)
        .dry_run(cli.dry_run)
        .build()
        .context("Invalid retention rules")?;

    log::debug!(
        "Rules: delete [{}], keep [{}], age fallback: {}, min size: {:?}, dry run: {}",
        rules.delete_patterns().as_strs().collect::<Vec<_>>().join(", "),
        rules.keep_patterns().as_strs().collect::<Vec<_>>().join(", "),
        rules.age_preference(),
        rules.min_size(),
        rules.dry_run()
    );
    Ok(rules)
}

/// Run refdup with parsed arguments and return the exit code.
///
/// # Errors
///
/// Fatal conditions only: invalid configuration or rules, no usable
/// folder, or an interrupt during the scan. Per-file failures are logged,
/// skipped, and reflected in [`ExitCode::PartialSuccess`].
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_cli(&cli);

    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(ExitCode::Success);
    }

    let rules = build_rules(&config, &cli)?;
    let shutdown = signal::install_handler()?;

    let progress = Arc::new(Progress::new(!config.progress || cli.quiet || cli.json));
    let finder = DuplicateFinder::new(
        FinderConfig::default()
            .with_io_threads(config.io_threads)
            .with_min_size(rules.min_size())
            .with_order_by_age(rules.age_preference().is_active())
            .with_walker_config(WalkerConfig::new(config.follow_symlinks))
            .with_shutdown_flag(shutdown.flag())
            .with_progress_callback(progress),
    );

    let (sets, scan) = finder.find_duplicates(&cli.folders)?;

    let verdicts = resolver::resolve_all(&sets, &rules);
    for verdict in &verdicts {
        report::log_verdict(verdict);
    }

    let executor = Executor::new(
        ExecutorConfig::default()
            .with_dry_run(rules.dry_run())
            .with_shutdown_flag(shutdown.flag()),
    );
    let execution = executor.execute_all(&verdicts);

    let summary = RunSummary::new(&scan, &verdicts, &execution, rules.dry_run());
    log::info!("{}", summary.render());
    if cli.json {
        println!("{}", summary.to_json_pretty()?);
    }

    let code = if summary.interrupted || shutdown.is_shutdown_requested() {
        ExitCode::Interrupted
    } else if summary.has_errors() {
        ExitCode::PartialSuccess
    } else {
        ExitCode::Success
    };
    Ok(code)
}
