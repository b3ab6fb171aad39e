// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod job;
pub mod logging;
pub mod render;
pub mod report;
pub mod types;
pub mod version;

use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::model::Catalog;
use crate::engine::{BuildPlan, JobSupervisor, PlanOptions, RunLoop, RunState, Summary};
use crate::errors::EcobuildError;
use crate::exec::GitFetcher;
use crate::exec::toolchain::with_runtime;
use crate::job::Job;
use crate::render::{DEFAULT_WIDTH, Header, RenderMode, TerminalRenderer};
use crate::version::{VersionSource, resolve_version};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - catalog loading and project selection
/// - version resolution
/// - the run loop with the git fetcher and the live renderer
/// - summary and report
///
/// Returns `true` when every non-ignored job passed.
pub async fn run(args: CliArgs) -> Result<bool> {
    let catalog = load_and_validate(&args.catalog)?;
    let jobs = select_jobs(&catalog.jobs, &args.projects)?;

    if args.dry_run {
        print_dry_run(&catalog, &jobs, &args);
        return Ok(true);
    }

    let mode = if args.plain || !std::io::stdout().is_terminal() {
        RenderMode::Plain
    } else {
        RenderMode::Live
    };
    // Two columns of slack: emoji count as one char but take two cells.
    let columns = crossterm::terminal::size()
        .map(|(cols, _)| usize::from(cols))
        .unwrap_or(DEFAULT_WIDTH);
    let mut renderer =
        TerminalRenderer::new(std::io::stdout(), mode).with_width(columns.saturating_sub(2));
    info!(?mode, jobs = jobs.len(), "starting run");

    if args.clean && args.work_dir.exists() {
        renderer.println("🧹 Cleaning work directory...")?;
        std::fs::remove_dir_all(&args.work_dir)
            .with_context(|| format!("removing {}", args.work_dir.display()))?;
    }
    std::fs::create_dir_all(&args.work_dir)
        .with_context(|| format!("creating {}", args.work_dir.display()))?;

    let dependency = &catalog.settings.dependency;
    if args.dependency_version.is_none() {
        renderer.println(&format!("🔍 Fetching latest {dependency} version..."))?;
    }
    let resolved = resolve_version(
        &catalog.version,
        args.dependency_version.as_deref(),
        version::LOOKUP_TIMEOUT,
    )
    .await;

    let settings_file = if resolved.is_custom() {
        prerelease_settings(&catalog)?
    } else {
        None
    };

    match resolved.source {
        VersionSource::Requested => {
            renderer.println(&format!(
                "📦 Using custom {dependency} version: {}",
                resolved.version
            ))?;
            if let Some(ref path) = settings_file {
                renderer.println(&format!(
                    "🔓 Pre-release/snapshot repositories enabled via {}",
                    path.display()
                ))?;
            }
        }
        VersionSource::Latest => {
            renderer.println(&format!("📦 Using {dependency} version: {}", resolved.version))?;
        }
        VersionSource::Fallback { ref reason } => {
            renderer.println(&format!("⚠️  Could not fetch latest version: {reason}"))?;
            renderer.println(&format!("📦 Using fallback version: {}", resolved.version))?;
        }
    }
    renderer.println("")?;

    let options = PlanOptions {
        quiet: args.quiet_downloads,
        settings_file,
    };
    let plan = BuildPlan::new(&catalog.build, &resolved.version, &options);
    let mut supervisor = JobSupervisor::new(
        Box::new(GitFetcher::new()),
        plan,
        &catalog.settings,
        &args.work_dir,
    );
    if let Some(timeout) = args.timeout {
        supervisor = supervisor.with_build_timeout(timeout);
    }

    let header = Header {
        title: catalog.settings.title.clone(),
        dependency: dependency.clone(),
        version: resolved.version.clone(),
    };
    let run_loop = RunLoop::new(supervisor, header.clone());
    let mut state = RunState::from_jobs(&jobs);
    let results = run_loop.run(&jobs, &mut state, &mut renderer).await?;

    let summary = Summary::from_results(&results);
    info!(
        passed = summary.passed,
        failed = summary.failed,
        ignored = summary.ignored,
        "run finished"
    );
    for line in summary.console_lines(&args.work_dir, renderer.color()) {
        renderer.println(&line)?;
    }

    match report::write_report(&args.work_dir, &header, &results, chrono::Utc::now()) {
        Ok(path) => renderer.println(&format!("📊 Report saved to: {}", path.display()))?,
        Err(e) => {
            warn!(error = %e, "could not write report");
            renderer.println(&format!("⚠️  Warning: Could not write report: {e}"))?;
        }
    }

    Ok(summary.all_passed())
}

/// Restrict `jobs` to the requested names, keeping catalog order.
///
/// An empty request selects everything. Names that match nothing are
/// logged; a request that matches nothing at all is an error.
pub fn select_jobs(jobs: &[Job], requested: &[String]) -> crate::errors::Result<Vec<Job>> {
    let requested: Vec<&str> = requested
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if requested.is_empty() {
        return Ok(jobs.to_vec());
    }

    for name in &requested {
        if !jobs.iter().any(|j| j.name == *name) {
            warn!(project = %name, "requested project is not in the catalog");
        }
    }

    let selected: Vec<Job> = jobs
        .iter()
        .filter(|j| requested.contains(&j.name.as_str()))
        .cloned()
        .collect();
    if selected.is_empty() {
        return Err(EcobuildError::UnknownProjects {
            requested: requested.iter().map(|s| s.to_string()).collect(),
            available: jobs.iter().map(|j| j.name.clone()).collect(),
        });
    }
    Ok(selected)
}

/// Absolute path of `[build].prerelease_settings` if it exists in the
/// current directory.
fn prerelease_settings(catalog: &Catalog) -> Result<Option<PathBuf>> {
    let Some(ref name) = catalog.build.prerelease_settings else {
        return Ok(None);
    };
    let path = Path::new(name);
    if !path.exists() {
        debug!(path = %name, "no pre-release settings file");
        return Ok(None);
    }
    let absolute = std::path::absolute(path)
        .with_context(|| format!("resolving {}", path.display()))?;
    Ok(Some(absolute))
}

/// Simple dry-run output: print jobs and the commands each would run.
fn print_dry_run(catalog: &Catalog, jobs: &[Job], args: &CliArgs) {
    let version = args
        .dependency_version
        .clone()
        .unwrap_or_else(|| "{version}".to_string());
    let options = PlanOptions {
        quiet: args.quiet_downloads,
        settings_file: None,
    };
    let plan = BuildPlan::new(&catalog.build, &version, &options);
    let default_timeout = args.timeout.unwrap_or(catalog.settings.timeout);

    let mut out = std::io::stdout().lock();
    let _ = writeln!(out, "ecobuild dry-run");
    let _ = writeln!(out, "  catalog = {}", args.catalog.display());
    let _ = writeln!(out, "  work_dir = {}", args.work_dir.display());
    let _ = writeln!(out, "  {} version = {version}", catalog.settings.dependency);
    let _ = writeln!(out);

    let _ = writeln!(out, "jobs ({}):", jobs.len());
    for job in jobs {
        let _ = writeln!(out, "  - {} ({:?})", job.name, job.kind);
        let _ = writeln!(out, "      repo: {}", job.repo);
        if let Some(ref branch) = job.branch {
            let _ = writeln!(out, "      branch: {branch}");
        }
        if let Some(ref reason) = job.ignore_reason {
            let _ = writeln!(out, "      ignored: {reason}");
            continue;
        }

        let checkout = args.work_dir.join(&job.name);
        let dir = plan.build_dir(job, &checkout);
        for stage in plan.setup_stages(&dir) {
            let stage = with_runtime(stage, job.runtime_version.as_deref());
            let _ = writeln!(out, "      setup: {stage}");
        }
        let stage = with_runtime(plan.build_stage(job, &dir), job.runtime_version.as_deref());
        let _ = writeln!(out, "      build: {stage}");
        let _ = writeln!(
            out,
            "      timeout: {}",
            config::duration::format_duration(&job.timeout.unwrap_or(default_timeout))
        );
    }

    debug!("dry-run complete (no execution)");
}
