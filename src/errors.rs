// src/errors.rs

//! Crate-wide error types.
//!
//! - [`EcobuildError`] covers everything that can abort the tool itself
//!   (bad catalog, IO on the work directory, broken invariants).
//! - [`JobError`] is the per-job failure taxonomy. It never escapes the job
//!   boundary: the supervisor turns it into a terminal `JobResult`.

use std::time::Duration;

use thiserror::Error;

use crate::config::duration::format_duration;
use crate::types::JobStatus;

#[derive(Error, Debug)]
pub enum EcobuildError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("No matching projects found for: {}", .requested.join(", "))]
    UnknownProjects {
        requested: Vec<String>,
        available: Vec<String>,
    },

    #[error("version lookup failed: {0}")]
    VersionLookup(String),

    #[error("unknown job '{0}'")]
    UnknownJob(String),

    #[error("invalid status transition for job '{job}': {from:?} -> {to:?}")]
    InvalidTransition {
        job: String,
        from: JobStatus,
        to: JobStatus,
    },

    #[error("cannot start job '{job}' while '{running}' is still running")]
    AlreadyRunning { job: String, running: String },

    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Why a job did not pass.
///
/// `Display` is the human-readable message stored in the job result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobError {
    #[error("could not prepare source: {0}")]
    Prepare(String),

    /// Best-effort stage failure; logged, never terminal.
    #[error("setup stage `{stage}` failed: {detail}")]
    Setup { stage: String, detail: String },

    #[error("build failed (exit code: {exit_code})")]
    BuildFailure { exit_code: i32 },

    #[error("build timed out after {}", format_duration(.deadline))]
    BuildTimeout { deadline: Duration },

    #[error("error: {0}")]
    Unexpected(String),
}

impl From<EcobuildError> for JobError {
    fn from(err: EcobuildError) -> Self {
        JobError::Unexpected(err.to_string())
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, EcobuildError>;
