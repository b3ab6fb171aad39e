// src/job.rs

//! Job records and their results.

use std::path::PathBuf;
use std::time::Duration;

use crate::errors::JobError;
use crate::types::JobKind;

/// One project to build. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub name: String,
    pub kind: JobKind,
    pub repo: String,
    pub branch: Option<String>,
    pub build_subdir: Option<String>,
    pub runtime_version: Option<String>,
    pub extra_repository: bool,
    pub extra_args: Vec<String>,
    pub ignore_reason: Option<String>,
    /// Overrides the run-wide build deadline.
    pub timeout: Option<Duration>,
}

impl Job {
    pub fn builder(name: &str, repo: &str) -> JobBuilder {
        JobBuilder::new(name, repo)
    }

    pub fn is_ignored(&self) -> bool {
        self.ignore_reason.is_some()
    }
}

/// Builder for [`Job`], used by the catalog loader and by tests.
#[derive(Debug, Clone)]
pub struct JobBuilder {
    job: Job,
}

impl JobBuilder {
    pub fn new(name: &str, repo: &str) -> Self {
        Self {
            job: Job {
                name: name.to_string(),
                kind: JobKind::Library,
                repo: repo.to_string(),
                branch: None,
                build_subdir: None,
                runtime_version: None,
                extra_repository: false,
                extra_args: Vec::new(),
                ignore_reason: None,
                timeout: None,
            },
        }
    }

    pub fn kind(mut self, kind: JobKind) -> Self {
        self.job.kind = kind;
        self
    }

    pub fn branch(mut self, branch: &str) -> Self {
        self.job.branch = Some(branch.to_string());
        self
    }

    pub fn build_subdir(mut self, dir: &str) -> Self {
        self.job.build_subdir = Some(dir.to_string());
        self
    }

    pub fn runtime_version(mut self, version: &str) -> Self {
        self.job.runtime_version = Some(version.to_string());
        self
    }

    pub fn extra_repository(mut self, enabled: bool) -> Self {
        self.job.extra_repository = enabled;
        self
    }

    pub fn extra_arg(mut self, arg: &str) -> Self {
        self.job.extra_args.push(arg.to_string());
        self
    }

    pub fn ignored(mut self, reason: &str) -> Self {
        self.job.ignore_reason = Some(reason.to_string());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.job.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Job {
        self.job
    }
}

/// How a job's lifecycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Passed,
    Failed(JobError),
    Ignored { reason: String },
}

/// Final record for one job. Created once, when the job's lifecycle ends.
#[derive(Debug, Clone, PartialEq)]
pub struct JobResult {
    pub name: String,
    pub kind: JobKind,
    pub outcome: JobOutcome,
    pub duration: Duration,
    pub log_path: Option<PathBuf>,
}

impl JobResult {
    pub fn passed(job: &Job, duration: Duration, log_path: PathBuf) -> Self {
        Self {
            name: job.name.clone(),
            kind: job.kind,
            outcome: JobOutcome::Passed,
            duration,
            log_path: Some(log_path),
        }
    }

    pub fn failed(job: &Job, error: JobError, duration: Duration, log_path: PathBuf) -> Self {
        Self {
            name: job.name.clone(),
            kind: job.kind,
            outcome: JobOutcome::Failed(error),
            duration,
            log_path: Some(log_path),
        }
    }

    /// Ignored jobs never run, so they carry no duration and no log.
    pub fn ignored(job: &Job) -> Self {
        Self {
            name: job.name.clone(),
            kind: job.kind,
            outcome: JobOutcome::Ignored {
                reason: job.ignore_reason.clone().unwrap_or_default(),
            },
            duration: Duration::ZERO,
            log_path: None,
        }
    }

    pub fn success(&self) -> bool {
        matches!(self.outcome, JobOutcome::Passed)
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self.outcome, JobOutcome::Ignored { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self.outcome,
            JobOutcome::Failed(JobError::BuildTimeout { .. })
        )
    }

    pub fn error(&self) -> Option<&JobError> {
        match &self.outcome {
            JobOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn message(&self) -> String {
        match &self.outcome {
            JobOutcome::Passed => "build successful".to_string(),
            JobOutcome::Failed(err) => err.to_string(),
            JobOutcome::Ignored { reason } => format!("ignored: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignored_result_is_not_a_failure() {
        let job = Job::builder("ckeditor", "https://example.invalid/ckeditor")
            .ignored("Failed: looks like a failure but is not")
            .build();
        let result = JobResult::ignored(&job);

        assert!(result.is_ignored());
        assert!(!result.success());
        assert!(result.error().is_none());
        assert_eq!(result.duration, Duration::ZERO);
        assert!(result.log_path.is_none());
    }

    #[test]
    fn messages_carry_exit_code_and_deadline() {
        let job = Job::builder("a", "r").build();
        let failed = JobResult::failed(
            &job,
            JobError::BuildFailure { exit_code: 127 },
            Duration::from_secs(3),
            PathBuf::from("work/a-build.log"),
        );
        assert_eq!(failed.message(), "build failed (exit code: 127)");

        let timed_out = JobResult::failed(
            &job,
            JobError::BuildTimeout {
                deadline: Duration::from_secs(120),
            },
            Duration::from_secs(120),
            PathBuf::from("work/a-build.log"),
        );
        assert!(timed_out.is_timeout());
        assert_eq!(timed_out.message(), "build timed out after 2 min");
    }
}
