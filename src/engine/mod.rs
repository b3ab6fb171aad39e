// src/engine/mod.rs

//! Orchestration of a whole run.
//!
//! - [`state`] holds the per-job status table (`RunState`).
//! - [`plan`] builds the stage commands for each job (`BuildPlan`).
//! - [`supervisor`] drives one job to a terminal `JobResult`.
//! - [`run_loop`] walks the catalog in order and repaints the screen.
//! - [`summary`] aggregates the results.

pub mod plan;
pub mod run_loop;
pub mod state;
pub mod summary;
pub mod supervisor;

pub use plan::{BuildPlan, PlanOptions};
pub use run_loop::RunLoop;
pub use state::{RunEntry, RunState};
pub use summary::Summary;
pub use supervisor::JobSupervisor;
