// tests/process_runner.rs

#![cfg(unix)]

use std::error::Error;
use std::time::{Duration, Instant};

use ecobuild::exec::{ExitOutcome, LogSink, ProcessRunner, StageCommand};
use ecobuild_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

fn sh(dir: &std::path::Path, script: &str) -> StageCommand {
    StageCommand::new("sh", dir).arg("-c").arg(script)
}

#[tokio::test]
async fn exit_codes_are_reported_verbatim() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let mut log = LogSink::open(dir.path().join("job-build.log"))?;
    let runner = ProcessRunner::new();

    for (script, expected) in [("exit 0", 0), ("exit 1", 1), ("no-such-command-xyz", 127)] {
        let outcome = runner
            .run_silent(&sh(dir.path(), script), Duration::from_secs(10), &mut log)
            .await?;
        assert_eq!(outcome, ExitOutcome::Exited { code: expected }, "{script}");
        assert_eq!(outcome.success(), expected == 0);
    }
    Ok(())
}

#[tokio::test]
async fn stderr_is_merged_in_order_and_logged_before_callback() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let log_path = dir.path().join("job-build.log");
    let mut log = LogSink::open(&log_path)?;

    let script = "echo one; echo two >&2; echo three; echo four >&2";
    let mut seen = Vec::new();
    let outcome = ProcessRunner::new()
        .run(&sh(dir.path(), script), Duration::from_secs(10), &mut log, |line| {
            seen.push(line.to_string());
        })
        .await?;
    log.close()?;

    assert_eq!(outcome, ExitOutcome::Exited { code: 0 });
    assert_eq!(seen, vec!["one", "two", "three", "four"]);
    assert_eq!(std::fs::read_to_string(&log_path)?, "one\ntwo\nthree\nfour\n");
    Ok(())
}

#[tokio::test]
async fn deadline_kills_the_whole_process_group() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let pid_file = dir.path().join("sleeper.pid");
    let mut log = LogSink::open(dir.path().join("job-build.log"))?;

    // The backgrounded sleep inherits the pipe; only a group kill ends it.
    let script = format!(
        "sleep 30 & echo $! > {}; echo started; wait",
        pid_file.display()
    );
    let started = Instant::now();
    let outcome = ProcessRunner::new()
        .run(&sh(dir.path(), &script), Duration::from_secs(1), &mut log, |_| {})
        .await?;
    let elapsed = started.elapsed();

    assert_eq!(
        outcome,
        ExitOutcome::TimedOut {
            deadline: Duration::from_secs(1)
        }
    );
    assert!(elapsed < Duration::from_secs(5), "took {elapsed:?}");

    let pid: libc::pid_t = std::fs::read_to_string(&pid_file)?.trim().parse()?;
    // Give the kernel a moment to tear the group down.
    let mut alive = true;
    for _ in 0..50 {
        alive = is_running(pid);
        if !alive {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(!alive, "background sleep {pid} survived the deadline");
    Ok(())
}

/// Exists and is not a zombie waiting for an absent reaper.
fn is_running(pid: libc::pid_t) -> bool {
    // SAFETY: signal 0 only checks for existence.
    if unsafe { libc::kill(pid, 0) } != 0 {
        return false;
    }
    match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
        Ok(stat) => stat
            .rsplit_once(") ")
            .map(|(_, rest)| !rest.starts_with('Z'))
            .unwrap_or(true),
        // No procfs on this platform: trust the signal check.
        Err(_) => !std::path::Path::new("/proc/self").exists(),
    }
}

#[tokio::test]
async fn every_callback_line_is_in_the_log_in_order() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let log_path = dir.path().join("job-build.log");
    let mut log = LogSink::open(&log_path)?;
    log.write_line("$ sh -c ...")?;

    let mut seen = Vec::new();
    ProcessRunner::new()
        .run(
            &sh(dir.path(), "i=0; while [ $i -lt 500 ]; do echo line-$i; i=$((i+1)); done"),
            Duration::from_secs(10),
            &mut log,
            |line| seen.push(line.to_string()),
        )
        .await?;
    log.close()?;

    let logged = std::fs::read_to_string(&log_path)?;
    let logged: Vec<&str> = logged.lines().skip(1).collect();
    assert_eq!(seen.len(), 500);
    assert_eq!(logged, seen);
    Ok(())
}

#[tokio::test]
async fn missing_program_is_a_spawn_error() -> TestResult {
    let dir = tempfile::tempdir()?;
    let mut log = LogSink::open(dir.path().join("job-build.log"))?;
    let stage = StageCommand::new("definitely-not-installed-xyz", dir.path());

    let err = ProcessRunner::new()
        .run_silent(&stage, Duration::from_secs(1), &mut log)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("definitely-not-installed-xyz"));
    Ok(())
}
