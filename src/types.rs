// src/types.rs

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// What a job builds. Only affects grouping in the status table and report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    #[default]
    Library,
    Application,
}

impl JobKind {
    /// Group heading used by the status table and the markdown report.
    pub fn heading(self) -> &'static str {
        match self {
            JobKind::Library => "📦 Libraries",
            JobKind::Application => "🚀 Applications",
        }
    }
}

impl FromStr for JobKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "library" | "addon" => Ok(JobKind::Library),
            "application" | "app" => Ok(JobKind::Application),
            other => Err(format!(
                "invalid job kind: {other} (expected \"library\" or \"application\")"
            )),
        }
    }
}

/// Status of a job within one run.
///
/// Transitions are monotonic:
///
/// ```text
/// Pending -> Running -> Passed | Failed
/// Pending -> Ignored
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    Pending,
    Running,
    Passed,
    Failed,
    Ignored,
}

impl JobStatus {
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Running)
                | (JobStatus::Pending, JobStatus::Ignored)
                | (JobStatus::Running, JobStatus::Passed)
                | (JobStatus::Running, JobStatus::Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Passed | JobStatus::Failed | JobStatus::Ignored
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStatus::Pending => "PENDING",
            JobStatus::Running => "BUILDING",
            JobStatus::Passed => "PASSED",
            JobStatus::Failed => "FAILED",
            JobStatus::Ignored => "IGNORED",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_forward_transitions_are_allowed() {
        use JobStatus::*;
        assert!(Pending.can_transition_to(Running));
        assert!(Pending.can_transition_to(Ignored));
        assert!(Running.can_transition_to(Passed));
        assert!(Running.can_transition_to(Failed));

        assert!(!Pending.can_transition_to(Passed));
        assert!(!Running.can_transition_to(Ignored));
        assert!(!Passed.can_transition_to(Running));
        assert!(!Failed.can_transition_to(Pending));
        assert!(!Ignored.can_transition_to(Running));
        assert!(!Running.can_transition_to(Running));
    }

    #[test]
    fn kind_parses_aliases() {
        assert_eq!(JobKind::from_str("addon"), Ok(JobKind::Library));
        assert_eq!(JobKind::from_str(" Application "), Ok(JobKind::Application));
        assert!(JobKind::from_str("plugin").is_err());
    }
}
