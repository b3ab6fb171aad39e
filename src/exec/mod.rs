// src/exec/mod.rs

//! Process execution layer.
//!
//! Everything that touches an external process lives here. Callers describe
//! work as [`StageCommand`]s and get back an [`ExitOutcome`]; output lines
//! are always appended to a [`LogSink`] first.
//!
//! - [`command`] is the opaque argument-vector description of one stage.
//! - [`runner`] spawns a stage, merges its output and enforces the deadline.
//! - [`log_sink`] is the durable per-job log file.
//! - [`toolchain`] wraps stages so they run under an SDKMAN Java version.
//! - [`fetch`] provides the `SourceFetcher` trait and the git-backed
//!   `GitFetcher` used in production, which tests replace with a fake.

pub mod command;
pub mod fetch;
pub mod log_sink;
pub mod runner;
pub mod toolchain;

pub use command::StageCommand;
pub use fetch::{FetchContext, GitFetcher, PrepareFuture, SourceFetcher};
pub use log_sink::LogSink;
pub use runner::{ExitOutcome, ProcessRunner};
pub use toolchain::with_runtime;
