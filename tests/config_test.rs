//! Tests for layered Settings loading

use std::fs;

use tempfile::TempDir;

use glosstree::application::ApplicationError;
use glosstree::config::{local_config_path, RawSettings, Settings};
use glosstree::domain::MatchMode;

#[test]
fn given_local_config_when_loading_then_overrides_defaults() {
    // Arrange
    let temp = TempDir::new().unwrap();
    fs::write(
        local_config_path(temp.path()),
        r#"
source_file = "~/exports/glossary.json"

[display]
show_child_count = true
"#,
    )
    .unwrap();

    // Act
    let settings = Settings::load(Some(temp.path())).unwrap();

    // Assert
    assert!(settings.display.show_child_count);
    assert!(settings.display.show_type);
    let home = std::env::var("HOME").expect("HOME should be set");
    let source = settings.source_file.expect("source_file from local config");
    assert!(source.starts_with(&home));
    assert!(source.ends_with("exports/glossary.json"));
}

#[test]
fn given_malformed_local_config_when_loading_then_config_error() {
    let temp = TempDir::new().unwrap();
    fs::write(local_config_path(temp.path()), "[search\nmode =").unwrap();

    let err = Settings::load(Some(temp.path())).unwrap_err();

    assert!(matches!(err, ApplicationError::Config { .. }));
}

#[test]
fn given_effective_settings_when_shown_then_toml_reads_back() {
    let mut settings = Settings::default();
    settings.search.mode = MatchMode::Regex;

    let shown = settings.to_toml().unwrap();
    let raw: RawSettings = toml::from_str(&shown).unwrap();

    assert!(shown.contains("mode = \"regex\""));
    assert_eq!(raw.search.mode, Some(MatchMode::Regex));
    assert_eq!(raw.display.show_type, Some(true));
}
