// src/render/status.rs

//! The status block: run header plus the per-job table.

use std::time::Instant;

use crossterm::style::Stylize;

use crate::config::duration::format_elapsed;
use crate::engine::state::{RunEntry, RunState};
use crate::render::tail::truncate;
use crate::types::{JobKind, JobStatus};

const RULE_WIDTH: usize = 60;
const NAME_WIDTH: usize = 28;

/// Static part of the status block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub title: String,
    pub dependency: String,
    pub version: String,
}

/// Snapshot of everything the full repaint shows.
///
/// `now` is passed in rather than read inside so that two views built from
/// the same state render identically.
#[derive(Debug, Clone, Copy)]
pub struct StatusView<'a> {
    pub header: &'a Header,
    pub state: &'a RunState,
    pub now: Instant,
}

impl<'a> StatusView<'a> {
    pub fn new(header: &'a Header, state: &'a RunState, now: Instant) -> Self {
        Self { header, state, now }
    }

    /// Render the block as individual lines, without trailing newlines.
    ///
    /// Lines whose length depends on catalog data are cut to `width`
    /// characters so each one occupies a single terminal row.
    pub fn lines(&self, color: bool, width: usize) -> Vec<String> {
        let rule = "=".repeat(RULE_WIDTH);
        let mut lines = vec![
            rule.clone(),
            truncate(&format!("🏗️  {}", self.header.title), width),
            format!(
                "🎯 Testing against {} version: {}",
                self.header.dependency,
                tone(&self.header.version, Tone::Cyan, color)
            ),
            rule,
        ];

        let mut first_group = true;
        for kind in [JobKind::Library, JobKind::Application] {
            let entries: Vec<&RunEntry> = self
                .state
                .entries()
                .iter()
                .filter(|e| e.kind == kind)
                .collect();
            if entries.is_empty() {
                continue;
            }
            if !first_group {
                lines.push(String::new());
            }
            first_group = false;

            lines.push(format!("  {}", tone(kind.heading(), Tone::Cyan, color)));
            for entry in entries {
                lines.push(format!(
                    "    {:<width$} {}",
                    entry.name,
                    self.status_text(entry, color),
                    width = NAME_WIDTH
                ));
            }
        }

        let failures: Vec<&RunEntry> = self
            .state
            .entries()
            .iter()
            .filter(|e| e.status == JobStatus::Failed)
            .collect();
        if !failures.is_empty() {
            lines.push(String::new());
            for entry in failures {
                let log = entry
                    .log_path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "-".to_string());
                let pointer = truncate(
                    &format!("💥 {} failed. Log: {}", entry.name, log),
                    width.saturating_sub(2),
                );
                lines.push(format!("  {}", tone(&pointer, Tone::Red, color)));
            }
        }

        lines.push(String::new());
        lines
    }

    fn status_text(&self, entry: &RunEntry, color: bool) -> String {
        let duration = entry
            .duration
            .map(|d| format!(" ({})", format_elapsed(d)))
            .unwrap_or_default();

        match entry.status {
            JobStatus::Pending => tone("⏳ PENDING", Tone::Dim, color),
            JobStatus::Running => {
                let elapsed = entry
                    .started_at
                    .map(|t| format!(" ({}s)", self.now.saturating_duration_since(t).as_secs()))
                    .unwrap_or_default();
                tone(&format!("🔨 BUILDING...{elapsed}"), Tone::Yellow, color)
            }
            JobStatus::Passed => format!("{}{duration}", tone("✅ PASSED", Tone::Green, color)),
            JobStatus::Failed => format!("{}{duration}", tone("❌ FAILED", Tone::Red, color)),
            JobStatus::Ignored => tone("⏭️  IGNORED", Tone::Dim, color),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Tone {
    Dim,
    Cyan,
    Yellow,
    Green,
    Red,
}

/// Apply a color when enabled; plain text otherwise.
pub(crate) fn tone(text: &str, tone: Tone, color: bool) -> String {
    if !color {
        return text.to_string();
    }
    let styled = match tone {
        Tone::Dim => text.dim(),
        Tone::Cyan => text.cyan(),
        Tone::Yellow => text.yellow(),
        Tone::Green => text.green(),
        Tone::Red => text.red(),
    };
    styled.to_string()
}
