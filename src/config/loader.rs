// src/config/loader.rs

use std::convert::TryFrom;
use std::fs;
use std::path::Path;

use crate::config::model::{Catalog, RawCatalog};
use crate::errors::{EcobuildError, Result};

/// Load a catalog file and return the raw, unvalidated `RawCatalog`.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawCatalog> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| {
        EcobuildError::ConfigError(format!("reading catalog file at {:?}: {}", path, e))
    })?;

    let raw: RawCatalog = toml::from_str(&contents)?;
    Ok(raw)
}

/// Load a catalog file and validate it.
///
/// This is the entry point for the rest of the application.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Catalog> {
    let raw = load_from_path(&path)?;
    Catalog::try_from(raw)
}
