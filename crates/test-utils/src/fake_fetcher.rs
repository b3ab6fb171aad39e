use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use ecobuild::errors::JobError;
use ecobuild::exec::{FetchContext, PrepareFuture, SourceFetcher};
use ecobuild::job::Job;

/// A fake fetcher that:
/// - records which jobs were prepared
/// - creates an empty checkout directory instead of cloning
/// - fails preparation for the names given to [`FakeFetcher::failing`]
/// - panics while preparing the names given to [`FakeFetcher::panicking`].
#[derive(Clone, Default)]
pub struct FakeFetcher {
    prepared: Arc<Mutex<Vec<String>>>,
    failing: HashSet<String>,
    panicking: HashSet<String>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    pub fn panicking(mut self, name: &str) -> Self {
        self.panicking.insert(name.to_string());
        self
    }

    /// Names passed to `prepare`, in call order.
    pub fn prepared(&self) -> Vec<String> {
        self.prepared.lock().unwrap().clone()
    }
}

impl SourceFetcher for FakeFetcher {
    fn prepare<'a>(&'a self, job: &'a Job, ctx: FetchContext<'a>) -> PrepareFuture<'a> {
        Box::pin(async move {
            self.prepared.lock().unwrap().push(job.name.clone());
            (ctx.notify)(&format!("📥 Preparing {}...", job.name));
            ctx.log
                .write_line(&format!("fake checkout of {}", job.repo))
                .map_err(JobError::from)?;

            if self.panicking.contains(&job.name) {
                panic!("fetcher bug while preparing {}", job.name);
            }
            if self.failing.contains(&job.name) {
                return Err(JobError::Prepare(format!("no such repository: {}", job.repo)));
            }

            let dir = ctx.work_dir.join(&job.name);
            std::fs::create_dir_all(&dir).map_err(|e| JobError::Prepare(e.to_string()))?;
            Ok(dir)
        })
    }
}
