// src/config/mod.rs

//! Catalog loading and validation.
//!
//! - `model.rs`: the TOML-backed data model and the validated [`Catalog`].
//! - `loader.rs`: read a catalog file from disk.
//! - `validate.rs`: semantic checks and `RawCatalog -> Catalog` conversion.
//! - `duration.rs`: `"2m"`-style duration strings.

pub mod duration;
pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{BuildSection, Catalog, JobConfig, RawCatalog, Settings, SettingsSection, VersionSection};
pub use validate::validate_catalog;
