// src/engine/run_loop.rs

use std::io::Write;
use std::time::Instant;

use tracing::info;

use crate::engine::state::RunState;
use crate::engine::supervisor::JobSupervisor;
use crate::errors::Result;
use crate::job::{Job, JobResult};
use crate::render::screen::TerminalRenderer;
use crate::render::status::{Header, StatusView};

/// Runs jobs one after another in catalog order.
///
/// A job's failure never stops the loop; only renderer or state errors do.
pub struct RunLoop {
    supervisor: JobSupervisor,
    header: Header,
}

impl RunLoop {
    pub fn new(supervisor: JobSupervisor, header: Header) -> Self {
        Self { supervisor, header }
    }

    pub fn supervisor(&self) -> &JobSupervisor {
        &self.supervisor
    }

    pub async fn run<W: Write>(
        &self,
        jobs: &[Job],
        state: &mut RunState,
        renderer: &mut TerminalRenderer<W>,
    ) -> Result<Vec<JobResult>> {
        let mut results = Vec::with_capacity(jobs.len());
        self.repaint(state, renderer)?;

        for job in jobs {
            if job.is_ignored() {
                info!(
                    job = %job.name,
                    reason = job.ignore_reason.as_deref().unwrap_or_default(),
                    "job ignored"
                );
                results.push(JobResult::ignored(job));
                continue;
            }

            state.mark_running(&job.name, Instant::now())?;
            self.repaint(state, renderer)?;

            let result = self.supervisor.supervise(job, renderer).await;

            state.finish(&result)?;
            self.repaint(state, renderer)?;
            results.push(result);
        }

        Ok(results)
    }

    fn repaint<W: Write>(&self, state: &RunState, renderer: &mut TerminalRenderer<W>) -> Result<()> {
        let view = StatusView::new(&self.header, state, Instant::now());
        renderer.repaint_full(&view)
    }
}
