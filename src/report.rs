// src/report.rs

//! Markdown report written to `{work_dir}/results.md` after a run.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::duration::format_elapsed;
use crate::engine::summary::Summary;
use crate::errors::Result;
use crate::job::JobResult;
use crate::render::status::Header;
use crate::types::JobKind;

pub const REPORT_FILE: &str = "results.md";

/// Render the full report.
///
/// `now` is a parameter so the output is reproducible.
pub fn render_markdown(header: &Header, results: &[JobResult], now: DateTime<Utc>) -> String {
    let summary = Summary::from_results(results);
    let status = if summary.all_passed() {
        "🎉 All tests passed"
    } else {
        "💔 Some tests failed"
    };

    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(out, "# {} Report\n", header.title);
    let _ = writeln!(out, "**{} Version:** `{}`", header.dependency, header.version);
    let _ = writeln!(out, "**Last Run:** {} UTC", now.format("%Y-%m-%d %H:%M"));
    let _ = writeln!(out, "**Status:** {status}\n");

    for kind in [JobKind::Library, JobKind::Application] {
        let rows: Vec<&JobResult> = results.iter().filter(|r| r.kind == kind).collect();
        if rows.is_empty() {
            continue;
        }
        let _ = writeln!(out, "## {}\n", kind.heading());
        out.push_str("| Project | Status | Duration |\n");
        out.push_str("|---------|--------|----------|\n");
        for result in rows {
            let _ = writeln!(
                out,
                "| {} | {} | {} |",
                result.name,
                status_cell(result),
                duration_cell(result)
            );
        }
        out.push('\n');
    }

    out.push_str("---\n");
    let _ = writeln!(
        out,
        "**Summary:** {} total | ✅ {} passed | ❌ {} failed | ⏭️ {} ignored",
        summary.total, summary.passed, summary.failed, summary.ignored
    );
    out
}

/// Write the report into `work_dir` and return its path.
pub fn write_report(
    work_dir: &Path,
    header: &Header,
    results: &[JobResult],
    now: DateTime<Utc>,
) -> Result<PathBuf> {
    fs::create_dir_all(work_dir)?;
    let path = work_dir.join(REPORT_FILE);
    fs::write(&path, render_markdown(header, results, now))?;
    info!(path = ?path, "report written");
    Ok(path)
}

fn status_cell(result: &JobResult) -> &'static str {
    if result.is_ignored() {
        "⏭️ IGNORED"
    } else if result.success() {
        "✅ PASSED"
    } else {
        "❌ FAILED"
    }
}

fn duration_cell(result: &JobResult) -> String {
    if result.duration.is_zero() {
        "-".to_string()
    } else {
        format_elapsed(result.duration)
    }
}
