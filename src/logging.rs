// src/logging.rs

//! Diagnostics for `ecobuild`.
//!
//! The live view owns stdout and redraws it in place, so diagnostics go to
//! stderr (or to `--log-file`) and stay at `warn` unless asked for. The
//! filter comes from `--log-level` when given, else from `ECOBUILD_LOG`,
//! which accepts full `tracing` directives such as `ecobuild::exec=debug`.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

/// Environment variable holding the filter when `--log-level` is absent.
pub const LOG_ENV: &str = "ECOBUILD_LOG";

const DEFAULT_DIRECTIVE: &str = "warn";

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>, log_file: Option<&Path>) -> Result<()> {
    let env = std::env::var(LOG_ENV).ok();
    let filter = build_filter(cli_level, env.as_deref());
    let subscriber = fmt().with_env_filter(filter).with_target(true);

    let Some(path) = log_file else {
        return subscriber
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| anyhow!(e));
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    subscriber
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| anyhow!(e))
}

fn build_filter(cli_level: Option<LogLevel>, env: Option<&str>) -> EnvFilter {
    if let Some(level) = cli_level {
        return EnvFilter::new(level.directive());
    }
    env.map(str::trim)
        .filter(|d| !d.is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}
