// tests/supervisor_scenario.rs

#![cfg(unix)]

use std::error::Error;
use std::time::Duration;

use ecobuild::config::{BuildSection, Catalog};
use ecobuild::engine::{BuildPlan, JobSupervisor, PlanOptions, RunLoop, RunState, Summary};
use ecobuild::errors::JobError;
use ecobuild::job::JobOutcome;
use ecobuild::render::{Header, RenderMode, TerminalRenderer};
use ecobuild::types::JobStatus;
use ecobuild_test_utils::builders::{CatalogBuilder, JobConfigBuilder, shell_build_section};
use ecobuild_test_utils::fake_fetcher::FakeFetcher;
use ecobuild_test_utils::shared_buffer::SharedBuffer;
use ecobuild_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

fn header() -> Header {
    Header {
        title: "Scenario".to_string(),
        dependency: "Vaadin".to_string(),
        version: "25.0.5".to_string(),
    }
}

fn run_loop(catalog: &Catalog, fetcher: FakeFetcher, work_dir: &std::path::Path) -> RunLoop {
    let plan = BuildPlan::new(&catalog.build, "25.0.5", &PlanOptions::default());
    let supervisor = JobSupervisor::new(Box::new(fetcher), plan, &catalog.settings, work_dir);
    RunLoop::new(supervisor, header())
}

#[tokio::test]
async fn pass_timeout_and_ignored_jobs() -> TestResult {
    init_tracing();
    let work = tempfile::tempdir()?;
    let catalog = CatalogBuilder::new()
        .with_build(shell_build_section())
        .with_job(
            JobConfigBuilder::new("job-a")
                .script("echo building a; sleep 0.1; exit 0")
                .build(),
        )
        .with_job(
            JobConfigBuilder::new("job-b")
                .script("echo stuck; sleep 10")
                .timeout("1s")
                .build(),
        )
        .with_job(JobConfigBuilder::new("job-c").ignored("known broken").build())
        .build();

    let fetcher = FakeFetcher::new();
    let run_loop = run_loop(&catalog, fetcher.clone(), work.path());
    let mut state = RunState::from_jobs(&catalog.jobs);
    let mut renderer = TerminalRenderer::new(SharedBuffer::new(), RenderMode::Plain);

    let results = with_timeout(run_loop.run(&catalog.jobs, &mut state, &mut renderer)).await?;

    assert_eq!(results.len(), 3);

    let a = &results[0];
    assert!(a.success());
    assert!(a.duration > Duration::ZERO);
    assert_eq!(a.log_path.as_deref(), Some(work.path().join("job-a-build.log").as_path()));

    let b = &results[1];
    assert!(!b.success());
    assert!(b.is_timeout());
    assert_eq!(
        b.outcome,
        JobOutcome::Failed(JobError::BuildTimeout {
            deadline: Duration::from_secs(1)
        })
    );
    assert!(b.duration < Duration::from_secs(5));
    assert_eq!(b.message(), "build timed out after 1s");

    let c = &results[2];
    assert!(c.is_ignored());
    assert_eq!(c.duration, Duration::ZERO);
    assert_eq!(c.message(), "ignored: known broken");

    let summary = Summary::from_results(&results);
    assert_eq!((summary.passed, summary.failed, summary.ignored, summary.total), (1, 1, 1, 3));
    assert!(!summary.all_passed());

    // The ignored job never reached the fetcher or the Running state.
    assert_eq!(fetcher.prepared(), vec!["job-a", "job-b"]);
    assert_eq!(state.history("job-c"), vec![JobStatus::Pending, JobStatus::Ignored]);
    assert_eq!(
        state.history("job-b"),
        vec![JobStatus::Pending, JobStatus::Running, JobStatus::Failed]
    );
    assert!(state.running().is_none());
    Ok(())
}

#[tokio::test]
async fn exit_codes_and_prepare_failures_do_not_stop_the_run() -> TestResult {
    init_tracing();
    let work = tempfile::tempdir()?;
    let catalog = CatalogBuilder::new()
        .with_build(shell_build_section())
        .with_job(JobConfigBuilder::new("missing-repo").script("exit 0").build())
        .with_job(JobConfigBuilder::new("exit-one").script("exit 1").build())
        .with_job(
            JobConfigBuilder::new("not-found")
                .application()
                .script("no-such-tool-xyz")
                .build(),
        )
        .build();

    let run_loop = run_loop(&catalog, FakeFetcher::new().failing("missing-repo"), work.path());
    let mut state = RunState::from_jobs(&catalog.jobs);
    let mut renderer = TerminalRenderer::new(SharedBuffer::new(), RenderMode::Plain);

    let results = with_timeout(run_loop.run(&catalog.jobs, &mut state, &mut renderer)).await?;

    assert!(matches!(results[0].error(), Some(JobError::Prepare(_))));
    assert!(results[0].message().starts_with("could not prepare source"));
    assert_eq!(results[1].error(), Some(&JobError::BuildFailure { exit_code: 1 }));
    assert_eq!(results[2].error(), Some(&JobError::BuildFailure { exit_code: 127 }));
    assert_eq!(results[2].message(), "build failed (exit code: 127)");

    // Log path is recorded even when preparation failed.
    assert!(results[0].log_path.as_ref().is_some_and(|p| p.exists()));
    Ok(())
}

#[tokio::test]
async fn tail_lines_reach_the_screen_and_the_log() -> TestResult {
    init_tracing();
    let work = tempfile::tempdir()?;
    let catalog = CatalogBuilder::new()
        .with_build(shell_build_section())
        .with_tail_lines(3)
        .with_job(
            JobConfigBuilder::new("chatty")
                .script("for i in 1 2 3 4 5 6; do echo out-$i; done")
                .build(),
        )
        .build();

    let screen = SharedBuffer::new();
    let run_loop = run_loop(&catalog, FakeFetcher::new(), work.path());
    let mut state = RunState::from_jobs(&catalog.jobs);
    let mut renderer = TerminalRenderer::new(screen.clone(), RenderMode::Live).with_color(false);

    let results = with_timeout(run_loop.run(&catalog.jobs, &mut state, &mut renderer)).await?;
    assert!(results[0].success());

    let shown = screen.contents();
    assert!(shown.contains("  out-6\n"));
    assert!(shown.contains("  $ sh -c "));
    // Tail and notices were erased when the job ended.
    assert_eq!(renderer.tail_region().painted(), 0);

    let log = std::fs::read_to_string(work.path().join("chatty-build.log"))?;
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines[0], "fake checkout of https://example.invalid/chatty");
    assert!(lines[1].starts_with("$ sh -c"));
    assert_eq!(&lines[2..], ["out-1", "out-2", "out-3", "out-4", "out-5", "out-6"]);
    Ok(())
}

fn failing_setup_section() -> BuildSection {
    BuildSection {
        setup: vec![vec!["-c".to_string(), "echo setup-out; exit 9".to_string()]],
        ..shell_build_section()
    }
}

#[tokio::test]
async fn failed_setup_stage_does_not_fail_the_job() -> TestResult {
    init_tracing();
    let work = tempfile::tempdir()?;
    let catalog = CatalogBuilder::new()
        .with_build(failing_setup_section())
        .with_job(JobConfigBuilder::new("pinned").script("echo built").build())
        .build();

    let screen = SharedBuffer::new();
    let run_loop = run_loop(&catalog, FakeFetcher::new(), work.path());
    let mut state = RunState::from_jobs(&catalog.jobs);
    let mut renderer = TerminalRenderer::new(screen.clone(), RenderMode::Live).with_color(false);

    let results = with_timeout(run_loop.run(&catalog.jobs, &mut state, &mut renderer)).await?;
    assert!(results[0].success(), "{}", results[0].message());

    let log = std::fs::read_to_string(work.path().join("pinned-build.log"))?;
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(
        &lines[1..],
        [
            "$ sh -c echo setup-out; exit 9",
            "setup-out",
            "$ sh -c echo built",
            "built",
        ]
    );

    // Setup output is silent: only the build's own output reaches the tail.
    let shown = screen.contents().replace("\x1b[1A\x1b[2K", "");
    assert!(shown.lines().any(|l| l == "  built"));
    assert!(!shown.lines().any(|l| l == "  setup-out"));
    Ok(())
}

#[tokio::test]
async fn panicking_fetcher_fails_only_its_job() -> TestResult {
    init_tracing();
    let work = tempfile::tempdir()?;
    let catalog = CatalogBuilder::new()
        .with_build(shell_build_section())
        .with_job(JobConfigBuilder::new("buggy").script("exit 0").build())
        .with_job(JobConfigBuilder::new("healthy").script("echo ok").build())
        .build();

    let run_loop = run_loop(&catalog, FakeFetcher::new().panicking("buggy"), work.path());
    let mut state = RunState::from_jobs(&catalog.jobs);
    let mut renderer = TerminalRenderer::new(SharedBuffer::new(), RenderMode::Live).with_color(false);

    let results = with_timeout(run_loop.run(&catalog.jobs, &mut state, &mut renderer)).await?;

    match results[0].error() {
        Some(JobError::Unexpected(msg)) => {
            assert!(msg.contains("fetcher bug while preparing buggy"), "{msg}");
        }
        other => panic!("expected an unexpected-error result, got {other:?}"),
    }
    assert_eq!(state.get("buggy").map(|e| e.status), Some(JobStatus::Failed));
    assert!(results[1].success());
    assert_eq!(renderer.tail_region().painted(), 0);
    Ok(())
}
