// src/engine/summary.rs

use std::path::Path;

use crate::job::JobResult;
use crate::render::status::{Tone, tone};

/// Aggregate counts over a run's results.
///
/// Ignored jobs count towards `total` but never decide the exit status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
    pub ignored: usize,
    pub total: usize,
}

impl Summary {
    pub fn from_results(results: &[JobResult]) -> Self {
        let mut summary = Summary {
            total: results.len(),
            ..Summary::default()
        };
        for result in results {
            if result.is_ignored() {
                summary.ignored += 1;
            } else if result.success() {
                summary.passed += 1;
            } else {
                summary.failed += 1;
            }
        }
        summary
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Closing lines printed under the final status block.
    pub fn console_lines(&self, work_dir: &Path, color: bool) -> Vec<String> {
        let icon = if self.all_passed() { "🎉" } else { "💔" };
        let failed = format!("❌ Failed: {}", self.failed);
        let failed = if self.failed > 0 {
            tone(&failed, Tone::Red, color)
        } else {
            failed
        };

        vec![
            "-".repeat(60),
            format!("📁 Build logs saved to: {}/", work_dir.display()),
            String::new(),
            format!(
                "{icon} Total: {} | {} | {} | ⏭️  Ignored: {}",
                self.total,
                tone(&format!("✅ Passed: {}", self.passed), Tone::Green, color),
                failed,
                self.ignored
            ),
            "=".repeat(60),
        ]
    }
}
