// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::duration::parse_duration;

/// Command-line arguments for `ecobuild`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "ecobuild",
    version,
    about = "Build a catalog of downstream projects against one dependency version.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the catalog file (TOML).
    #[arg(long, value_name = "PATH", default_value = "Ecobuild.toml")]
    pub catalog: PathBuf,

    /// Version to pin instead of the latest release. Enables the
    /// pre-release settings file.
    #[arg(short = 'v', long, value_name = "VERSION")]
    pub dependency_version: Option<String>,

    /// Directory for checkouts, build logs and the report.
    #[arg(short = 'w', long, value_name = "DIR", default_value = "work")]
    pub work_dir: PathBuf,

    /// Remove the work directory before starting.
    #[arg(short = 'c', long)]
    pub clean: bool,

    /// Only build these projects (comma separated).
    #[arg(short = 'p', long, value_name = "NAMES", value_delimiter = ',')]
    pub projects: Vec<String>,

    /// Hide dependency download progress in build output.
    #[arg(short = 'q', long)]
    pub quiet_downloads: bool,

    /// Build deadline per project, e.g. `5m`. Overrides the catalog.
    #[arg(short = 't', long, value_name = "DURATION", value_parser = parse_duration)]
    pub timeout: Option<std::time::Duration>,

    /// Never redraw in place, even on a terminal.
    #[arg(long)]
    pub plain: bool,

    /// Validate the catalog and print the planned commands without running them.
    #[arg(long)]
    pub dry_run: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `ECOBUILD_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Write diagnostics to this file instead of stderr.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// The level as a `tracing` filter directive.
    pub fn directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_flags_and_project_list() {
        let args = CliArgs::try_parse_from([
            "ecobuild",
            "-v",
            "25.1.0.rc1",
            "-p",
            "flow-viritin,super-fields",
            "-t",
            "5m",
            "-cq",
        ])
        .unwrap();

        assert_eq!(args.dependency_version.as_deref(), Some("25.1.0.rc1"));
        assert_eq!(args.projects, vec!["flow-viritin", "super-fields"]);
        assert_eq!(args.timeout, Some(std::time::Duration::from_secs(300)));
        assert!(args.clean);
        assert!(args.quiet_downloads);
        assert_eq!(args.work_dir, PathBuf::from("work"));
        assert_eq!(args.catalog, PathBuf::from("Ecobuild.toml"));
    }
}
