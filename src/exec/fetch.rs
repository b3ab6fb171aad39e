// src/exec/fetch.rs

//! Workspace preparation: make sure a job's sources are checked out and
//! current before any build stage runs.
//!
//! The supervisor talks to a [`SourceFetcher`] instead of running git itself,
//! so tests can hand it a fetcher that just creates a directory.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::duration::format_duration;
use crate::errors::JobError;
use crate::exec::command::StageCommand;
use crate::exec::log_sink::LogSink;
use crate::exec::runner::{ExitOutcome, ProcessRunner};
use crate::job::Job;

/// Everything a fetcher may use while preparing one job.
pub struct FetchContext<'a> {
    pub runner: &'a ProcessRunner,
    pub log: &'a mut LogSink,
    /// Parent directory of all checkouts.
    pub work_dir: &'a Path,
    /// Deadline for each fetch command.
    pub deadline: Duration,
    /// Shows a one-line progress notice above the tail.
    pub notify: &'a mut (dyn FnMut(&str) + 'a),
}

pub type PrepareFuture<'a> =
    Pin<Box<dyn Future<Output = std::result::Result<PathBuf, JobError>> + 'a>>;

/// Trait abstracting how a job's workspace gets prepared.
pub trait SourceFetcher {
    /// Ensure the checkout for `job` exists and is up to date; return its
    /// root directory. Failures are reported as [`JobError::Prepare`].
    fn prepare<'a>(&'a self, job: &'a Job, ctx: FetchContext<'a>) -> PrepareFuture<'a>;
}

/// Fetcher backed by the `git` command line.
///
/// - Absent checkout: shallow, single-branch clone.
/// - Existing checkout: discard local changes (version pins from the previous
///   run), shallow fetch, hard reset to the remote branch.
#[derive(Debug, Clone)]
pub struct GitFetcher {
    program: String,
}

impl GitFetcher {
    pub fn new() -> Self {
        Self {
            program: "git".to_string(),
        }
    }

    async fn clone_repo(
        &self,
        job: &Job,
        ctx: &mut FetchContext<'_>,
    ) -> std::result::Result<(), JobError> {
        (ctx.notify)(&format!("📥 Cloning {}...", job.repo));

        let mut args = vec!["clone", "--depth", "1", "--single-branch"];
        if let Some(ref branch) = job.branch {
            args.push("--branch");
            args.push(branch.as_str());
        }
        args.push(job.repo.as_str());
        args.push(job.name.as_str());

        let work_dir = ctx.work_dir.to_path_buf();
        let code = self.git(ctx, &work_dir, &args).await?;
        if code != 0 {
            return Err(JobError::Prepare(format!(
                "git clone exited with code {code}"
            )));
        }
        Ok(())
    }

    async fn update_repo(
        &self,
        job: &Job,
        ctx: &mut FetchContext<'_>,
        project_dir: &Path,
    ) -> std::result::Result<(), JobError> {
        (ctx.notify)("🔄 Updating repository...");

        self.git(ctx, project_dir, &["checkout", "--", "."]).await?;

        let branch = match job.branch {
            Some(ref branch) => {
                let code = self
                    .git(ctx, project_dir, &["fetch", "--depth", "1", "origin", branch.as_str()])
                    .await?;
                if code != 0 {
                    warn!(job = %job.name, exit_code = code, "git fetch failed; using existing checkout");
                }
                self.checkout_branch(ctx, project_dir, branch).await?;
                branch.clone()
            }
            None => {
                let code = self.git(ctx, project_dir, &["fetch", "--depth", "1"]).await?;
                if code != 0 {
                    warn!(job = %job.name, exit_code = code, "git fetch failed; using existing checkout");
                }
                self.default_branch(ctx, project_dir).await
            }
        };

        let target = format!("origin/{branch}");
        let code = self
            .git(ctx, project_dir, &["reset", "--hard", target.as_str()])
            .await?;
        if code != 0 {
            return Err(JobError::Prepare(format!(
                "git reset to {target} exited with code {code}"
            )));
        }
        Ok(())
    }

    async fn checkout_branch(
        &self,
        ctx: &mut FetchContext<'_>,
        project_dir: &Path,
        branch: &str,
    ) -> std::result::Result<(), JobError> {
        if self.git(ctx, project_dir, &["checkout", branch]).await? == 0 {
            return Ok(());
        }
        let tracking = format!("origin/{branch}");
        let code = self
            .git(ctx, project_dir, &["checkout", "-b", branch, tracking.as_str()])
            .await?;
        if code != 0 {
            return Err(JobError::Prepare(format!(
                "could not check out branch {branch}"
            )));
        }
        Ok(())
    }

    /// Remote default branch, from `origin/HEAD`; `main` if unknown.
    async fn default_branch(&self, ctx: &mut FetchContext<'_>, project_dir: &Path) -> String {
        let stage = StageCommand::new(&self.program, project_dir).args([
            "symbolic-ref",
            "refs/remotes/origin/HEAD",
            "--short",
        ]);

        let mut last_line = String::new();
        let outcome = ctx
            .runner
            .run(&stage, ctx.deadline, ctx.log, |line| {
                last_line = line.trim().to_string();
            })
            .await;

        match outcome {
            Ok(ExitOutcome::Exited { code: 0 }) => {
                if let Some(branch) = last_line.strip_prefix("origin/") {
                    return branch.to_string();
                }
                debug!(output = %last_line, "unexpected symbolic-ref output");
            }
            Ok(other) => debug!(?other, "symbolic-ref failed"),
            Err(e) => debug!(error = %e, "symbolic-ref could not run"),
        }
        "main".to_string()
    }

    async fn git(
        &self,
        ctx: &mut FetchContext<'_>,
        cwd: &Path,
        args: &[&str],
    ) -> std::result::Result<i32, JobError> {
        let stage = StageCommand::new(&self.program, cwd).args(args.iter().copied());
        match ctx.runner.run_silent(&stage, ctx.deadline, ctx.log).await {
            Ok(ExitOutcome::Exited { code }) => Ok(code),
            Ok(ExitOutcome::TimedOut { deadline }) => Err(JobError::Prepare(format!(
                "`{}` timed out after {}",
                stage.label(),
                format_duration(&deadline)
            ))),
            Err(e) => Err(JobError::Prepare(e.to_string())),
        }
    }
}

impl Default for GitFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceFetcher for GitFetcher {
    fn prepare<'a>(&'a self, job: &'a Job, mut ctx: FetchContext<'a>) -> PrepareFuture<'a> {
        Box::pin(async move {
            let project_dir = ctx.work_dir.join(&job.name);
            if project_dir.exists() {
                self.update_repo(job, &mut ctx, &project_dir).await?;
            } else {
                self.clone_repo(job, &mut ctx).await?;
            }
            info!(job = %job.name, dir = ?project_dir, "workspace prepared");
            Ok(project_dir)
        })
    }
}
