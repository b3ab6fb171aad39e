// src/exec/runner.rs

//! Stage process runner.
//!
//! Every stage is one child process whose stdout and stderr share a single
//! pipe, so the log sees exactly the interleaving the process produced.
//!
//! Two parties cooperate while a stage runs:
//! - a reader thread doing blocking line reads on the pipe and forwarding
//!   lines over a channel;
//! - the calling task, which drains that channel into the [`LogSink`] and the
//!   caller's callback while racing a deadline timer.
//!
//! On deadline expiry the whole process group is killed. That closes every
//! write end of the pipe, which is what unblocks the reader thread.

use std::io::{BufRead, BufReader, PipeReader};
use std::process::{ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::{EcobuildError, Result};
use crate::exec::command::StageCommand;
use crate::exec::log_sink::LogSink;

/// How a stage process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// The process exited on its own. Signal deaths map to `128 + signal`.
    Exited { code: i32 },
    /// The deadline fired first and the process was killed.
    TimedOut { deadline: Duration },
}

impl ExitOutcome {
    pub fn success(&self) -> bool {
        matches!(self, ExitOutcome::Exited { code: 0 })
    }
}

/// Spawns stage processes and supervises them until exit or deadline.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }

    /// Run a stage, streaming each output line to `on_line` after it has been
    /// appended to `log`. The log is flushed after every line.
    pub async fn run<F>(
        &self,
        stage: &StageCommand,
        deadline: Duration,
        log: &mut LogSink,
        on_line: F,
    ) -> Result<ExitOutcome>
    where
        F: FnMut(&str),
    {
        self.run_inner(stage, deadline, log, true, on_line).await
    }

    /// Run a stage whose output only goes to the log.
    pub async fn run_silent(
        &self,
        stage: &StageCommand,
        deadline: Duration,
        log: &mut LogSink,
    ) -> Result<ExitOutcome> {
        self.run_inner(stage, deadline, log, false, |_| {}).await
    }

    async fn run_inner<F>(
        &self,
        stage: &StageCommand,
        deadline: Duration,
        log: &mut LogSink,
        flush_each_line: bool,
        mut on_line: F,
    ) -> Result<ExitOutcome>
    where
        F: FnMut(&str),
    {
        info!(
            cmd = %stage,
            cwd = ?stage.cwd,
            deadline = ?deadline,
            "starting stage process"
        );
        let started = Instant::now();

        let (reader, writer) = std::io::pipe()?;
        let stderr_writer = writer.try_clone()?;

        let mut cmd = Command::new(&stage.program);
        cmd.args(&stage.args)
            .current_dir(&stage.cwd)
            .stdin(Stdio::null())
            .stdout(writer)
            .stderr(stderr_writer)
            .kill_on_drop(true);

        // Own process group, so a timeout can take down build tool daemons
        // and forked JVMs along with the direct child.
        #[cfg(unix)]
        cmd.process_group(0);

        let spawned = cmd.spawn();
        // The command still holds our copies of the write end. Once it is
        // gone, EOF on the reader means every process in the stage is done
        // writing.
        drop(cmd);
        let mut child = spawned.map_err(|source| EcobuildError::Spawn {
            program: stage.program.clone(),
            source,
        })?;

        let (tx, mut lines) = mpsc::unbounded_channel::<String>();
        spawn_line_reader(reader, tx)?;

        let timer = tokio::time::sleep(deadline);
        tokio::pin!(timer);
        let mut eof = false;

        loop {
            tokio::select! {
                // Deadline first: a chatty process must not starve the timer.
                biased;

                _ = &mut timer => {
                    warn!(
                        cmd = %stage.label(),
                        deadline = ?deadline,
                        "stage deadline elapsed; killing process group"
                    );
                    terminate(&mut child).await;
                    let late = drain_queued(&mut lines, log)?;
                    if late > 0 {
                        debug!(lines = late, "logged output queued before the kill");
                    }
                    log.flush()?;
                    return Ok(ExitOutcome::TimedOut { deadline });
                }

                line = lines.recv(), if !eof => match line {
                    Some(line) => {
                        log.write_line(&line)?;
                        if flush_each_line {
                            log.flush()?;
                        }
                        on_line(&line);
                    }
                    None => eof = true,
                },

                status = child.wait(), if eof => {
                    let status = status?;
                    log.flush()?;
                    let code = exit_code(status);
                    info!(
                        cmd = %stage.label(),
                        exit_code = code,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "stage process exited"
                    );
                    return Ok(ExitOutcome::Exited { code });
                }
            }
        }
    }
}

/// Blocking reader for the merged output pipe.
///
/// Ends on EOF, on a read error, or once the receiving side has been dropped
/// (after a timeout nobody listens any more).
fn spawn_line_reader(reader: PipeReader, tx: mpsc::UnboundedSender<String>) -> Result<()> {
    thread::Builder::new()
        .name("stage-output".to_string())
        .spawn(move || {
            let mut reader = BufReader::new(reader);
            let mut buf = Vec::new();
            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf) {
                    Ok(0) => break,
                    Ok(_) => {
                        if tx.send(decode_line(&buf)).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        debug!(error = %e, "stage output read failed");
                        break;
                    }
                }
            }
        })?;
    Ok(())
}

/// Append every line the reader thread has already queued. The process
/// wrote them before it was killed, so they belong in the log.
fn drain_queued(lines: &mut mpsc::UnboundedReceiver<String>, log: &mut LogSink) -> Result<usize> {
    let mut drained = 0;
    while let Ok(line) = lines.try_recv() {
        log.write_line(&line)?;
        drained += 1;
    }
    Ok(drained)
}

fn decode_line(raw: &[u8]) -> String {
    let mut line = String::from_utf8_lossy(raw).into_owned();
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    line
}

fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(sig) = status.signal() {
            return 128 + sig;
        }
    }
    -1
}

async fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Some(pid) = child.id() {
            // SAFETY: plain syscall on the group created with
            // `process_group(0)`, whose id equals the child's pid.
            let rc = unsafe { libc::killpg(pid as libc::pid_t, libc::SIGKILL) };
            if rc != 0 {
                debug!(
                    pid,
                    error = %std::io::Error::last_os_error(),
                    "killpg failed; falling back to killing the child"
                );
            }
        }
    }

    // Reaps the child; also covers platforms without process groups.
    if let Err(e) = child.kill().await {
        debug!(error = %e, "kill after deadline reported an error");
    }
}
