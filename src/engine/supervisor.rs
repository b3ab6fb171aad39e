// src/engine/supervisor.rs

//! One job's lifecycle, from workspace preparation to a terminal result.
//!
//! ```text
//! Preparing -> SettingUp -> Building -> Succeeded | Failed | TimedOut
//! ```
//!
//! Nothing in here returns an error to the caller: every failure, expected
//! or not, ends up inside the returned [`JobResult`]. That includes panics
//! raised while the job runs.

use std::any::Any;
use std::io::Write;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use futures::FutureExt;
use tracing::{debug, error, info, warn};

use crate::config::duration::format_duration;
use crate::config::model::Settings;
use crate::engine::plan::BuildPlan;
use crate::errors::JobError;
use crate::exec::command::StageCommand;
use crate::exec::fetch::{FetchContext, SourceFetcher};
use crate::exec::log_sink::LogSink;
use crate::exec::runner::{ExitOutcome, ProcessRunner};
use crate::exec::toolchain::with_runtime;
use crate::job::{Job, JobResult};
use crate::render::screen::TerminalRenderer;
use crate::render::tail::TailBuffer;

type JobOutcomeResult<T> = std::result::Result<T, JobError>;

pub struct JobSupervisor {
    fetcher: Box<dyn SourceFetcher>,
    runner: ProcessRunner,
    plan: BuildPlan,
    work_dir: PathBuf,
    setup_timeout: Duration,
    build_timeout: Duration,
    tail_lines: usize,
    tail_width: usize,
}

impl JobSupervisor {
    pub fn new(
        fetcher: Box<dyn SourceFetcher>,
        plan: BuildPlan,
        settings: &Settings,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fetcher,
            runner: ProcessRunner::new(),
            plan,
            work_dir: work_dir.into(),
            setup_timeout: settings.setup_timeout,
            build_timeout: settings.timeout,
            tail_lines: settings.tail_lines,
            tail_width: settings.tail_width,
        }
    }

    /// Override the run-wide build deadline (jobs with their own timeout
    /// keep it).
    pub fn with_build_timeout(mut self, timeout: Duration) -> Self {
        self.build_timeout = timeout;
        self
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn plan(&self) -> &BuildPlan {
        &self.plan
    }

    /// `{work_dir}/{name}-build.log`
    pub fn log_path(&self, job: &Job) -> PathBuf {
        self.work_dir.join(format!("{}-build.log", job.name))
    }

    /// Deadline for the main build stage of `job`.
    pub fn build_deadline(&self, job: &Job) -> Duration {
        job.timeout.unwrap_or(self.build_timeout)
    }

    /// Drive `job` to a terminal result. Ignored jobs return immediately
    /// without touching the workspace.
    pub async fn supervise<W: Write>(
        &self,
        job: &Job,
        renderer: &mut TerminalRenderer<W>,
    ) -> JobResult {
        if job.is_ignored() {
            return JobResult::ignored(job);
        }

        let started = Instant::now();
        let log_path = self.log_path(job);
        info!(job = %job.name, log = ?log_path, "job started");

        let outcome = AssertUnwindSafe(self.supervise_inner(job, &log_path, renderer))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| {
                let detail = panic_message(panic.as_ref());
                error!(job = %job.name, %detail, "job panicked");
                Err(JobError::Unexpected(format!("panicked: {detail}")))
            });

        if let Err(e) = renderer.end_tail_section() {
            debug!(job = %job.name, error = %e, "could not clear tail section");
        }
        let duration = started.elapsed();

        match outcome {
            Ok(()) => {
                info!(job = %job.name, elapsed_ms = duration.as_millis() as u64, "job passed");
                JobResult::passed(job, duration, log_path)
            }
            Err(err) => {
                warn!(job = %job.name, error = %err, "job failed");
                JobResult::failed(job, err, duration, log_path)
            }
        }
    }

    async fn supervise_inner<W: Write>(
        &self,
        job: &Job,
        log_path: &Path,
        renderer: &mut TerminalRenderer<W>,
    ) -> JobOutcomeResult<()> {
        std::fs::create_dir_all(&self.work_dir)
            .map_err(|e| JobError::Unexpected(format!("creating work directory: {e}")))?;
        let mut log = LogSink::open(log_path)?;

        let outcome = self.run_stages(job, &mut log, renderer).await;

        // Close even on failure so the log is complete on disk.
        match log.close() {
            Ok(_) => outcome,
            Err(e) => outcome.and(Err(e.into())),
        }
    }

    async fn run_stages<W: Write>(
        &self,
        job: &Job,
        log: &mut LogSink,
        renderer: &mut TerminalRenderer<W>,
    ) -> JobOutcomeResult<()> {
        let checkout = self.prepare(job, log, renderer).await?;
        let dir = self.plan.build_dir(job, &checkout);

        for stage in self.plan.setup_stages(&dir) {
            if let Err(err) = self.run_setup(job, &stage, log, renderer).await {
                // Pinning is best-effort; the build still runs.
                info!(job = %job.name, error = %err, "setup stage did not succeed");
            }
        }

        let stage = self.plan.build_stage(job, &dir);
        let deadline = self.build_deadline(job);
        let outcome = self.run_build(job, &stage, deadline, log, renderer).await?;
        classify(outcome)
    }

    async fn prepare<W: Write>(
        &self,
        job: &Job,
        log: &mut LogSink,
        renderer: &mut TerminalRenderer<W>,
    ) -> JobOutcomeResult<PathBuf> {
        debug!(job = %job.name, "preparing workspace");
        let mut notify = |msg: &str| {
            if let Err(e) = renderer.push_notice(msg) {
                debug!(error = %e, "could not show notice");
            }
        };
        let ctx = FetchContext {
            runner: &self.runner,
            log,
            work_dir: &self.work_dir,
            deadline: self.setup_timeout,
            notify: &mut notify,
        };
        self.fetcher.prepare(job, ctx).await
    }

    async fn run_setup<W: Write>(
        &self,
        job: &Job,
        stage: &StageCommand,
        log: &mut LogSink,
        renderer: &mut TerminalRenderer<W>,
    ) -> JobOutcomeResult<()> {
        self.announce(stage, log, renderer)?;
        let runnable = with_runtime(stage.clone(), job.runtime_version.as_deref());

        let setup_error = |detail: String| JobError::Setup {
            stage: stage.label(),
            detail,
        };
        match self.runner.run_silent(&runnable, self.setup_timeout, log).await {
            Ok(ExitOutcome::Exited { code: 0 }) => Ok(()),
            Ok(ExitOutcome::Exited { code }) => Err(setup_error(format!("exit code {code}"))),
            Ok(ExitOutcome::TimedOut { deadline }) => {
                Err(setup_error(format!(
                    "timed out after {}",
                    format_duration(&deadline)
                )))
            }
            Err(e) => Err(setup_error(e.to_string())),
        }
    }

    async fn run_build<W: Write>(
        &self,
        job: &Job,
        stage: &StageCommand,
        deadline: Duration,
        log: &mut LogSink,
        renderer: &mut TerminalRenderer<W>,
    ) -> JobOutcomeResult<ExitOutcome> {
        self.announce(stage, log, renderer)?;
        let runnable = with_runtime(stage.clone(), job.runtime_version.as_deref());

        let mut tail = TailBuffer::new(self.tail_lines);
        let width = self.tail_width;
        let outcome = self
            .runner
            .run(&runnable, deadline, log, |line| {
                tail.push(line);
                if let Err(e) = renderer.repaint_tail(&tail.display_lines(width)) {
                    debug!(error = %e, "tail repaint failed");
                }
            })
            .await?;

        if let ExitOutcome::TimedOut { deadline } = outcome {
            warn!(job = %job.name, ?deadline, "build timed out");
        }
        Ok(outcome)
    }

    /// Show `$ cmd` above the tail and mark the stage boundary in the log.
    fn announce<W: Write>(
        &self,
        stage: &StageCommand,
        log: &mut LogSink,
        renderer: &mut TerminalRenderer<W>,
    ) -> JobOutcomeResult<()> {
        let line = format!("$ {stage}");
        log.write_line(&line)?;
        log.flush()?;
        if let Err(e) = renderer.push_notice(&line) {
            debug!(error = %e, "could not show notice");
        }
        Ok(())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        return msg.to_string();
    }
    match payload.downcast_ref::<String>() {
        Some(msg) => msg.clone(),
        None => "unknown panic payload".to_string(),
    }
}

/// Map the main stage's exit to the job outcome.
pub fn classify(outcome: ExitOutcome) -> JobOutcomeResult<()> {
    match outcome {
        ExitOutcome::Exited { code: 0 } => Ok(()),
        ExitOutcome::Exited { code } => Err(JobError::BuildFailure { exit_code: code }),
        ExitOutcome::TimedOut { deadline } => Err(JobError::BuildTimeout { deadline }),
    }
}
