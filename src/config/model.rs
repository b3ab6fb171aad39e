// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::job::Job;
use crate::types::JobKind;

/// Raw catalog as read from a TOML file, before validation.
///
/// ```toml
/// [settings]
/// title = "Vaadin Ecosystem Build"
/// dependency = "Vaadin"
/// timeout = "2m"
///
/// [build]
/// program = "mvn"
/// main = ["clean", "verify"]
///
/// [[job]]
/// name = "flow-viritin"
/// repo = "https://github.com/viritin/flow-viritin"
/// ```
///
/// Every section except `[[job]]` is optional.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCatalog {
    #[serde(default)]
    pub settings: SettingsSection,

    #[serde(default)]
    pub version: VersionSection,

    #[serde(default)]
    pub build: BuildSection,

    /// Jobs in run order.
    #[serde(default)]
    pub job: Vec<JobConfig>,
}

/// `[settings]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SettingsSection {
    #[serde(default = "default_title")]
    pub title: String,

    /// Name of the dependency whose version gets pinned (header only).
    #[serde(default = "default_dependency")]
    pub dependency: String,

    /// Main build stage deadline, e.g. `"2m"`.
    #[serde(default = "default_timeout")]
    pub timeout: String,

    /// Deadline for fetch and version-pin stages.
    #[serde(default = "default_setup_timeout")]
    pub setup_timeout: String,

    #[serde(default = "default_tail_lines")]
    pub tail_lines: usize,

    #[serde(default = "default_tail_width")]
    pub tail_width: usize,
}

fn default_title() -> String {
    "Ecosystem Build".to_string()
}

fn default_dependency() -> String {
    "Vaadin".to_string()
}

fn default_timeout() -> String {
    "2m".to_string()
}

fn default_setup_timeout() -> String {
    "10m".to_string()
}

fn default_tail_lines() -> usize {
    10
}

fn default_tail_width() -> usize {
    70
}

impl Default for SettingsSection {
    fn default() -> Self {
        Self {
            title: default_title(),
            dependency: default_dependency(),
            timeout: default_timeout(),
            setup_timeout: default_setup_timeout(),
            tail_lines: default_tail_lines(),
            tail_width: default_tail_width(),
        }
    }
}

/// `[version]` section: where the "latest" version comes from.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionSection {
    #[serde(default = "default_metadata_url")]
    pub metadata_url: String,

    #[serde(default = "default_fallback")]
    pub fallback: String,
}

fn default_metadata_url() -> String {
    "https://repo1.maven.org/maven2/com/vaadin/vaadin-bom/maven-metadata.xml".to_string()
}

fn default_fallback() -> String {
    "25.0.5".to_string()
}

impl Default for VersionSection {
    fn default() -> Self {
        Self {
            metadata_url: default_metadata_url(),
            fallback: default_fallback(),
        }
    }
}

/// `[build]` section: the argument vectors of every stage.
///
/// `{version}` inside `setup` and `main` is replaced by the pinned version.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildSection {
    #[serde(default = "default_program")]
    pub program: String,

    #[serde(default = "default_common_args")]
    pub common_args: Vec<String>,

    /// Appended to every invocation with `--quiet-downloads`.
    #[serde(default = "default_quiet_args")]
    pub quiet_args: Vec<String>,

    /// Silent version-pin stages, run in order before the build.
    #[serde(default = "default_setup")]
    pub setup: Vec<Vec<String>>,

    #[serde(default = "default_main")]
    pub main: Vec<String>,

    /// Appended for jobs with `extra_repository = true`.
    #[serde(default = "default_extra_repository_args")]
    pub extra_repository_args: Vec<String>,

    /// Settings file passed with `--settings` when a custom version is pinned.
    #[serde(default = "default_prerelease_settings")]
    pub prerelease_settings: Option<String>,
}

fn default_program() -> String {
    "mvn".to_string()
}

fn default_common_args() -> Vec<String> {
    vec!["-B".to_string()]
}

fn default_quiet_args() -> Vec<String> {
    vec!["--no-transfer-progress".to_string()]
}

fn default_setup() -> Vec<Vec<String>> {
    vec![
        vec![
            "versions:set-property".to_string(),
            "-Dproperty=vaadin.version".to_string(),
            "-DnewVersion={version}".to_string(),
            "-DgenerateBackupPoms=false".to_string(),
        ],
        vec![
            "versions:set".to_string(),
            "-DnewVersion={version}".to_string(),
            "-DartifactId=vaadin-bom".to_string(),
            "-DgenerateBackupPoms=false".to_string(),
        ],
    ]
}

fn default_main() -> Vec<String> {
    vec!["clean".to_string(), "verify".to_string()]
}

fn default_extra_repository_args() -> Vec<String> {
    vec!["-Pvaadin-addons".to_string()]
}

fn default_prerelease_settings() -> Option<String> {
    Some("settings.xml".to_string())
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            program: default_program(),
            common_args: default_common_args(),
            quiet_args: default_quiet_args(),
            setup: default_setup(),
            main: default_main(),
            extra_repository_args: default_extra_repository_args(),
            prerelease_settings: default_prerelease_settings(),
        }
    }
}

/// One `[[job]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    pub name: String,

    #[serde(default)]
    pub kind: JobKind,

    pub repo: String,

    /// Branch to build; `None` means the remote default branch.
    #[serde(default)]
    pub branch: Option<String>,

    /// Subdirectory of the checkout the build runs in.
    #[serde(default)]
    pub build_subdir: Option<String>,

    /// SDKMAN Java identifier, e.g. `"21-tem"`.
    #[serde(default)]
    pub runtime_version: Option<String>,

    #[serde(default)]
    pub extra_repository: bool,

    #[serde(default)]
    pub extra_args: Vec<String>,

    /// Reason for skipping this job; presence marks it ignored.
    #[serde(default)]
    pub ignored: Option<String>,

    /// Per-job build deadline overriding `[settings].timeout`.
    #[serde(default)]
    pub timeout: Option<String>,
}

/// Run-wide knobs with durations already parsed.
#[derive(Debug, Clone)]
pub struct Settings {
    pub title: String,
    pub dependency: String,
    pub timeout: Duration,
    pub setup_timeout: Duration,
    pub tail_lines: usize,
    pub tail_width: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            title: default_title(),
            dependency: default_dependency(),
            timeout: Duration::from_secs(120),
            setup_timeout: Duration::from_secs(600),
            tail_lines: default_tail_lines(),
            tail_width: default_tail_width(),
        }
    }
}

/// Validated catalog. Construct through `TryFrom<RawCatalog>`.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub settings: Settings,
    pub version: VersionSection,
    pub build: BuildSection,
    pub jobs: Vec<Job>,
}

impl Catalog {
    pub fn job_names(&self) -> Vec<String> {
        self.jobs.iter().map(|j| j.name.clone()).collect()
    }
}
