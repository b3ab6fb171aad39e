// src/exec/log_sink.rs

//! Durable per-job build log.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::errors::Result;

/// Append-only, line-oriented writer for one job's log file.
///
/// Lines are buffered; callers decide when to [`flush`](LogSink::flush).
/// The process runner flushes after every main-stage line so `tail -f` on the
/// file keeps up with the build.
#[derive(Debug)]
pub struct LogSink {
    path: PathBuf,
    writer: BufWriter<File>,
    lines_written: u64,
}

impl LogSink {
    /// Open `path` in append mode, creating it (and its parent) if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            lines_written: 0,
        })
    }

    pub fn write_line(&mut self, line: &str) -> Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.lines_written += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }

    /// Flush and sync to disk.
    pub fn close(mut self) -> Result<PathBuf> {
        self.writer.flush()?;
        self.writer.get_ref().sync_all()?;
        Ok(self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("job-build.log");

        let mut sink = LogSink::open(&path).unwrap();
        sink.write_line("first").unwrap();
        sink.close().unwrap();

        let mut sink = LogSink::open(&path).unwrap();
        sink.write_line("second").unwrap();
        sink.flush().unwrap();
        assert_eq!(sink.lines_written(), 1);
        sink.close().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "first\nsecond\n");
    }
}
