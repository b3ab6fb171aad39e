#![allow(dead_code)]

use ecobuild::config::{BuildSection, Catalog, JobConfig, RawCatalog, SettingsSection, VersionSection};
use ecobuild::types::JobKind;

/// Builder for `Catalog` to simplify test setup.
pub struct CatalogBuilder {
    catalog: RawCatalog,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self {
            catalog: RawCatalog {
                settings: SettingsSection::default(),
                version: VersionSection::default(),
                build: BuildSection::default(),
                job: Vec::new(),
            },
        }
    }

    pub fn with_job(mut self, job: JobConfig) -> Self {
        self.catalog.job.push(job);
        self
    }

    pub fn with_timeout(mut self, timeout: &str) -> Self {
        self.catalog.settings.timeout = timeout.to_string();
        self
    }

    pub fn with_setup_timeout(mut self, timeout: &str) -> Self {
        self.catalog.settings.setup_timeout = timeout.to_string();
        self
    }

    pub fn with_tail_lines(mut self, lines: usize) -> Self {
        self.catalog.settings.tail_lines = lines;
        self
    }

    pub fn with_build(mut self, build: BuildSection) -> Self {
        self.catalog.build = build;
        self
    }

    pub fn raw(self) -> RawCatalog {
        self.catalog
    }

    pub fn build(self) -> Catalog {
        Catalog::try_from(self.catalog).expect("Failed to build valid catalog from builder")
    }
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Build section that runs each job's `extra_args` as a `sh -c` script and
/// has no setup stages.
///
/// A job with `extra_args = ["exit 3"]` therefore builds with `sh -c 'exit 3'`.
pub fn shell_build_section() -> BuildSection {
    BuildSection {
        program: "sh".to_string(),
        common_args: Vec::new(),
        quiet_args: Vec::new(),
        setup: Vec::new(),
        main: vec!["-c".to_string()],
        extra_repository_args: Vec::new(),
        prerelease_settings: None,
    }
}

/// Builder for `JobConfig`.
pub struct JobConfigBuilder {
    job: JobConfig,
}

impl JobConfigBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            job: JobConfig {
                name: name.to_string(),
                kind: JobKind::Library,
                repo: format!("https://example.invalid/{name}"),
                branch: None,
                build_subdir: None,
                runtime_version: None,
                extra_repository: false,
                extra_args: Vec::new(),
                ignored: None,
                timeout: None,
            },
        }
    }

    pub fn application(mut self) -> Self {
        self.job.kind = JobKind::Application;
        self
    }

    pub fn script(mut self, script: &str) -> Self {
        self.job.extra_args = vec![script.to_string()];
        self
    }

    pub fn branch(mut self, branch: &str) -> Self {
        self.job.branch = Some(branch.to_string());
        self
    }

    pub fn ignored(mut self, reason: &str) -> Self {
        self.job.ignored = Some(reason.to_string());
        self
    }

    pub fn timeout(mut self, timeout: &str) -> Self {
        self.job.timeout = Some(timeout.to_string());
        self
    }

    pub fn build(self) -> JobConfig {
        self.job
    }
}
