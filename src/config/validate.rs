// src/config/validate.rs

use std::collections::HashSet;
use std::convert::TryFrom;

use crate::config::duration::parse_duration;
use crate::config::model::{Catalog, JobConfig, RawCatalog, Settings};
use crate::errors::{EcobuildError, Result};
use crate::job::{Job, JobBuilder};

/// Run semantic validation against a loaded catalog.
///
/// This checks:
/// - there is at least one job
/// - job names are unique, non-empty and usable as file names
/// - every duration string parses
/// - tail geometry is sane
/// - the build command is not empty
pub fn validate_catalog(raw: &RawCatalog) -> Result<()> {
    ensure_has_jobs(raw)?;
    validate_settings(raw)?;
    validate_build(raw)?;
    validate_jobs(raw)?;
    Ok(())
}

fn ensure_has_jobs(raw: &RawCatalog) -> Result<()> {
    if raw.job.is_empty() {
        return Err(EcobuildError::ConfigError(
            "catalog must contain at least one [[job]] entry".to_string(),
        ));
    }
    Ok(())
}

fn validate_settings(raw: &RawCatalog) -> Result<()> {
    parse_setting("[settings].timeout", &raw.settings.timeout)?;
    parse_setting("[settings].setup_timeout", &raw.settings.setup_timeout)?;

    if raw.settings.tail_lines == 0 {
        return Err(EcobuildError::ConfigError(
            "[settings].tail_lines must be >= 1 (got 0)".to_string(),
        ));
    }
    if raw.settings.tail_width < 4 {
        return Err(EcobuildError::ConfigError(format!(
            "[settings].tail_width must be >= 4 (got {})",
            raw.settings.tail_width
        )));
    }
    Ok(())
}

fn validate_build(raw: &RawCatalog) -> Result<()> {
    if raw.build.program.trim().is_empty() {
        return Err(EcobuildError::ConfigError(
            "[build].program must not be empty".to_string(),
        ));
    }
    if raw.build.main.is_empty() {
        return Err(EcobuildError::ConfigError(
            "[build].main must contain at least one argument".to_string(),
        ));
    }
    Ok(())
}

fn validate_jobs(raw: &RawCatalog) -> Result<()> {
    let mut seen = HashSet::new();
    for job in &raw.job {
        let name = job.name.trim();
        if name.is_empty() {
            return Err(EcobuildError::ConfigError(
                "job name must not be empty".to_string(),
            ));
        }
        // The name doubles as checkout directory and log file prefix.
        if name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(EcobuildError::ConfigError(format!(
                "job name '{}' must be usable as a directory name",
                name
            )));
        }
        if !seen.insert(name.to_string()) {
            return Err(EcobuildError::ConfigError(format!(
                "duplicate job name '{}'",
                name
            )));
        }
        if job.repo.trim().is_empty() {
            return Err(EcobuildError::ConfigError(format!(
                "job '{}' has an empty `repo`",
                name
            )));
        }
        if let Some(ref t) = job.timeout {
            parse_setting(&format!("job '{}' timeout", name), t)?;
        }
    }
    Ok(())
}

fn parse_setting(what: &str, value: &str) -> Result<std::time::Duration> {
    let d = parse_duration(value)
        .map_err(|e| EcobuildError::ConfigError(format!("invalid {what}: {e}")))?;
    if d.is_zero() {
        return Err(EcobuildError::ConfigError(format!(
            "invalid {what}: must be greater than zero"
        )));
    }
    Ok(d)
}

fn job_from_config(cfg: &JobConfig) -> Result<Job> {
    let mut builder = JobBuilder::new(cfg.name.trim(), cfg.repo.trim())
        .kind(cfg.kind)
        .extra_repository(cfg.extra_repository);

    if let Some(ref branch) = cfg.branch {
        builder = builder.branch(branch);
    }
    if let Some(ref dir) = cfg.build_subdir {
        builder = builder.build_subdir(dir);
    }
    if let Some(ref version) = cfg.runtime_version {
        builder = builder.runtime_version(version);
    }
    for arg in &cfg.extra_args {
        builder = builder.extra_arg(arg);
    }
    if let Some(ref reason) = cfg.ignored {
        builder = builder.ignored(reason);
    }
    if let Some(ref t) = cfg.timeout {
        builder = builder.timeout(parse_setting(&format!("job '{}' timeout", cfg.name), t)?);
    }
    Ok(builder.build())
}

impl TryFrom<RawCatalog> for Catalog {
    type Error = EcobuildError;

    fn try_from(raw: RawCatalog) -> Result<Self> {
        validate_catalog(&raw)?;

        let settings = Settings {
            title: raw.settings.title.clone(),
            dependency: raw.settings.dependency.clone(),
            timeout: parse_setting("[settings].timeout", &raw.settings.timeout)?,
            setup_timeout: parse_setting(
                "[settings].setup_timeout",
                &raw.settings.setup_timeout,
            )?,
            tail_lines: raw.settings.tail_lines,
            tail_width: raw.settings.tail_width,
        };

        let jobs = raw
            .job
            .iter()
            .map(job_from_config)
            .collect::<Result<Vec<_>>>()?;

        Ok(Catalog {
            settings,
            version: raw.version,
            build: raw.build,
            jobs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_src: &str) -> Result<Catalog> {
        let raw: RawCatalog = toml::from_str(toml_src)?;
        Catalog::try_from(raw)
    }

    #[test]
    fn defaults_fill_missing_sections() {
        let catalog = parse(
            r#"
[[job]]
name = "flow-viritin"
repo = "https://github.com/viritin/flow-viritin"
"#,
        )
        .unwrap();

        assert_eq!(catalog.settings.timeout.as_secs(), 120);
        assert_eq!(catalog.settings.tail_lines, 10);
        assert_eq!(catalog.build.program, "mvn");
        assert_eq!(catalog.build.setup.len(), 2);
        assert_eq!(catalog.jobs[0].name, "flow-viritin");
        assert!(!catalog.jobs[0].is_ignored());
    }

    #[test]
    fn empty_catalog_is_rejected() {
        let err = parse("[settings]\ntitle = \"x\"\n").unwrap_err();
        assert!(matches!(err, EcobuildError::ConfigError(msg) if msg.contains("at least one")));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = parse(
            r#"
[[job]]
name = "a"
repo = "r1"

[[job]]
name = "a"
repo = "r2"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, EcobuildError::ConfigError(msg) if msg.contains("duplicate")));
    }

    #[test]
    fn bad_job_timeout_is_rejected() {
        let err = parse(
            r#"
[[job]]
name = "a"
repo = "r"
timeout = "soon"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, EcobuildError::ConfigError(msg) if msg.contains("job 'a' timeout")));
    }

    #[test]
    fn path_like_names_are_rejected() {
        let err = parse(
            r#"
[[job]]
name = "../escape"
repo = "r"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, EcobuildError::ConfigError(_)));
    }
}
