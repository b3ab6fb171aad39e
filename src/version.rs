// src/version.rs

//! Which dependency version a run pins.
//!
//! A version given on the command line wins and marks the run as custom.
//! Otherwise the `<release>` element of the registry's `maven-metadata.xml`
//! is used. Any lookup problem falls back to `[version].fallback`.

use std::time::Duration;

use regex::Regex;
use reqwest::Client;
use reqwest::redirect::Policy;
use tracing::{debug, info, warn};

use crate::config::model::VersionSection;
use crate::errors::{EcobuildError, Result};

/// Deadline for the whole metadata request, redirects included.
pub const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

const MAX_REDIRECTS: usize = 10;

/// Where the pinned version came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSource {
    Requested,
    Latest,
    Fallback { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    pub version: String,
    pub source: VersionSource,
}

impl ResolvedVersion {
    /// User-supplied versions may be pre-releases and enable the extra
    /// settings file.
    pub fn is_custom(&self) -> bool {
        self.source == VersionSource::Requested
    }
}

/// Extract the `<release>` value from maven metadata.
pub fn parse_release(xml: &str) -> Option<String> {
    let re = match Regex::new(r"<release>\s*([^<\s]+)\s*</release>") {
        Ok(re) => re,
        Err(e) => {
            warn!(error = %e, "invalid release pattern");
            return None;
        }
    };
    re.captures(xml).map(|caps| caps[1].to_string())
}

/// Decide the version for this run.
pub async fn resolve_version(
    section: &VersionSection,
    requested: Option<&str>,
    timeout: Duration,
) -> ResolvedVersion {
    if let Some(version) = requested.map(str::trim).filter(|v| !v.is_empty()) {
        return ResolvedVersion {
            version: version.to_string(),
            source: VersionSource::Requested,
        };
    }

    match fetch_latest(&section.metadata_url, timeout).await {
        Ok(version) => {
            info!(%version, "resolved latest release");
            ResolvedVersion {
                version,
                source: VersionSource::Latest,
            }
        }
        Err(e) => {
            warn!(error = %e, fallback = %section.fallback, "could not fetch latest version");
            ResolvedVersion {
                version: section.fallback.clone(),
                source: VersionSource::Fallback {
                    reason: e.to_string(),
                },
            }
        }
    }
}

async fn fetch_latest(url: &str, timeout: Duration) -> Result<String> {
    let lookup = |e: reqwest::Error| EcobuildError::VersionLookup(e.to_string());

    let client = Client::builder()
        .timeout(timeout)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .build()
        .map_err(lookup)?;

    debug!(%url, ?timeout, "fetching release metadata");
    let response = client.get(url).send().await.map_err(lookup)?;
    let status = response.status();
    if !status.is_success() {
        return Err(EcobuildError::VersionLookup(format!(
            "metadata request returned HTTP {status}"
        )));
    }

    let body = response.text().await.map_err(lookup)?;
    parse_release(&body).ok_or_else(|| {
        EcobuildError::VersionLookup("no <release> element in metadata".to_string())
    })
}
