// tests/catalog_config.rs

use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use ecobuild::config::load_and_validate;
use ecobuild::select_jobs;
use ecobuild::types::JobKind;

type TestResult = Result<(), Box<dyn Error>>;

fn shipped_catalog() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("Ecobuild.toml")
}

#[test]
fn shipped_catalog_loads() -> TestResult {
    let catalog = load_and_validate(shipped_catalog())?;

    assert_eq!(catalog.settings.title, "Vaadin Ecosystem Build");
    assert_eq!(catalog.settings.timeout, Duration::from_secs(120));
    assert_eq!(catalog.jobs.len(), 10);

    let super_fields = catalog
        .jobs
        .iter()
        .find(|j| j.name == "super-fields")
        .ok_or("super-fields missing")?;
    assert_eq!(super_fields.build_subdir.as_deref(), Some("superfields"));
    assert_eq!(super_fields.runtime_version.as_deref(), Some("21-tem"));

    let ignored: Vec<&str> = catalog
        .jobs
        .iter()
        .filter(|j| j.is_ignored())
        .map(|j| j.name.as_str())
        .collect();
    assert_eq!(ignored, vec!["vaadin-ckeditor"]);

    let apps: Vec<&str> = catalog
        .jobs
        .iter()
        .filter(|j| j.kind == JobKind::Application)
        .map(|j| j.name.as_str())
        .collect();
    assert_eq!(apps, vec!["spring-boot-spatial-example"]);
    Ok(())
}

#[test]
fn project_selection_keeps_catalog_order() -> TestResult {
    let catalog = load_and_validate(shipped_catalog())?;
    let requested = vec![
        "maplibre".to_string(),
        "flow-viritin".to_string(),
        "not-in-catalog".to_string(),
    ];

    let selected = select_jobs(&catalog.jobs, &requested)?;
    let names: Vec<&str> = selected.iter().map(|j| j.name.as_str()).collect();
    assert_eq!(names, vec!["flow-viritin", "maplibre"]);

    let all = select_jobs(&catalog.jobs, &[])?;
    assert_eq!(all.len(), catalog.jobs.len());
    Ok(())
}
