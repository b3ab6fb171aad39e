// src/engine/state.rs

//! Per-run job state.
//!
//! One `RunState` exists per run, owned by the run loop and handed out by
//! reference. Every status change goes through [`JobStatus::can_transition_to`].

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::errors::{EcobuildError, Result};
use crate::job::{Job, JobOutcome, JobResult};
use crate::types::{JobKind, JobStatus};

/// What the status table knows about one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunEntry {
    pub name: String,
    pub kind: JobKind,
    pub status: JobStatus,
    /// Final duration, set once the job is terminal.
    pub duration: Option<Duration>,
    /// Only present while the job is running.
    pub started_at: Option<Instant>,
    pub log_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct RunState {
    entries: Vec<RunEntry>,
    index: HashMap<String, usize>,
    history: Vec<(String, JobStatus)>,
}

impl RunState {
    /// Every job starts `Pending`; ignored jobs move to `Ignored` right away
    /// with a zero duration.
    pub fn from_jobs(jobs: &[Job]) -> Self {
        let mut state = RunState::default();
        for job in jobs {
            state.index.insert(job.name.clone(), state.entries.len());
            state.entries.push(RunEntry {
                name: job.name.clone(),
                kind: job.kind,
                status: JobStatus::Pending,
                duration: None,
                started_at: None,
                log_path: None,
            });
            state.history.push((job.name.clone(), JobStatus::Pending));

            if job.is_ignored() {
                let idx = state.entries.len() - 1;
                // Pending -> Ignored is always allowed.
                let entry = &mut state.entries[idx];
                entry.status = JobStatus::Ignored;
                entry.duration = Some(Duration::ZERO);
                state.history.push((job.name.clone(), JobStatus::Ignored));
            }
        }
        state
    }

    /// Move `name` to `Running`. At most one job runs at a time.
    pub fn mark_running(&mut self, name: &str, now: Instant) -> Result<()> {
        if let Some(other) = self.running() {
            if other.name != name {
                return Err(EcobuildError::AlreadyRunning {
                    job: name.to_string(),
                    running: other.name.clone(),
                });
            }
        }
        let idx = self.lookup(name)?;
        self.transition(idx, JobStatus::Running)?;
        self.entries[idx].started_at = Some(now);
        Ok(())
    }

    /// Record the terminal state of a job from its result.
    pub fn finish(&mut self, result: &JobResult) -> Result<()> {
        let idx = self.lookup(&result.name)?;
        let to = match result.outcome {
            JobOutcome::Passed => JobStatus::Passed,
            JobOutcome::Failed(_) => JobStatus::Failed,
            JobOutcome::Ignored { .. } => JobStatus::Ignored,
        };
        self.transition(idx, to)?;

        let entry = &mut self.entries[idx];
        entry.duration = Some(result.duration);
        entry.started_at = None;
        entry.log_path = result.log_path.clone();
        Ok(())
    }

    pub fn entries(&self) -> &[RunEntry] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&RunEntry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    pub fn running(&self) -> Option<&RunEntry> {
        self.entries
            .iter()
            .find(|e| e.status == JobStatus::Running)
    }

    /// Every status a job has been in, in order.
    pub fn history(&self, name: &str) -> Vec<JobStatus> {
        self.history
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, s)| *s)
            .collect()
    }

    fn lookup(&self, name: &str) -> Result<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| EcobuildError::UnknownJob(name.to_string()))
    }

    fn transition(&mut self, idx: usize, to: JobStatus) -> Result<()> {
        let entry = &mut self.entries[idx];
        let from = entry.status;
        if !from.can_transition_to(to) {
            return Err(EcobuildError::InvalidTransition {
                job: entry.name.clone(),
                from,
                to,
            });
        }
        debug!(job = %entry.name, ?from, ?to, "status transition");
        entry.status = to;
        self.history.push((entry.name.clone(), to));
        Ok(())
    }
}
