//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/glosstree/glosstree.toml`
//! 3. Local config: `<dir>/.glosstree.toml` (usually the working directory)
//! 4. Environment variables: `GLOSSTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::{ApplicationError, IoResultExt};
use crate::domain::{MatchMode, SearchQuery};

/// Search defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SearchConfig {
    /// Query interpretation: "substring" or "regex"
    pub mode: MatchMode,
    pub case_sensitive: bool,
}

/// Tree rendering options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DisplayConfig {
    /// Prefix nodes with their type glyph
    pub show_type: bool,
    /// Append the child count of inner nodes
    pub show_child_count: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_type: true,
            show_child_count: false,
        }
    }
}

/// Raw settings for intermediate parsing (every field optional to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub source_file: Option<PathBuf>,
    pub search: RawSearchConfig,
    pub display: RawDisplayConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSearchConfig {
    pub mode: Option<MatchMode>,
    pub case_sensitive: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawDisplayConfig {
    pub show_type: Option<bool>,
    pub show_child_count: Option<bool>,
}

/// Unified configuration for glosstree.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Listing file used when `--file` is not given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_file: Option<PathBuf>,
    pub search: SearchConfig,
    pub display: DisplayConfig,
}

/// Get the XDG config directory for glosstree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "glosstree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("glosstree.toml"))
}

/// Get the path to the local config file in `dir`.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".glosstree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).with_path_context("read config", path)?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// Expand `~`, `$VAR` and `${VAR}`; leaves the input untouched when expansion fails.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

impl Settings {
    /// Search query for `text`, using the configured mode and case handling.
    pub fn query(&self, text: impl Into<String>) -> SearchQuery {
        SearchQuery {
            text: text.into(),
            mode: self.search.mode,
            case_sensitive: self.search.case_sensitive,
        }
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        if let Some(source) = &self.source_file {
            let expanded = expand_env_vars(source.to_string_lossy().as_ref());
            self.source_file = Some(PathBuf::from(expanded));
        }
    }

    /// Overlay wins for every field it specifies.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            source_file: overlay
                .source_file
                .clone()
                .or_else(|| self.source_file.clone()),
            search: SearchConfig {
                mode: overlay.search.mode.unwrap_or(self.search.mode),
                case_sensitive: overlay
                    .search
                    .case_sensitive
                    .unwrap_or(self.search.case_sensitive),
            },
            display: DisplayConfig {
                show_type: overlay.display.show_type.unwrap_or(self.display.show_type),
                show_child_count: overlay
                    .display
                    .show_child_count
                    .unwrap_or(self.display.show_child_count),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.glosstree.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config
        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables (explicit override)
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();

        Ok(current)
    }

    /// Apply GLOSSTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("GLOSSTREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("source_file") {
            settings.source_file = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get_string("search.mode") {
            settings.search.mode = match val.to_ascii_lowercase().as_str() {
                "substring" => MatchMode::Substring,
                "regex" => MatchMode::Regex,
                other => {
                    return Err(ApplicationError::Config {
                        message: format!("GLOSSTREE_SEARCH__MODE: unknown mode '{other}'"),
                    })
                }
            };
        }
        if let Ok(val) = config.get_bool("search.case_sensitive") {
            settings.search.case_sensitive = val;
        }
        if let Ok(val) = config.get_bool("display.show_type") {
            settings.display.show_type = val;
        }
        if let Ok(val) = config.get_bool("display.show_child_count") {
            settings.display.show_child_count = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# glosstree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/glosstree/glosstree.toml
#   Local:  ./.glosstree.toml
#   Env:    GLOSSTREE_* environment variables (e.g. GLOSSTREE_SEARCH__MODE=regex)

# Listing file used when --file is not given
# source_file = "~/exports/glossary.json"

[search]
# "substring" (literal, default) or "regex"
# mode = "substring"
# case_sensitive = false

[display]
# show_type = true
# show_child_count = false
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_defaults_when_created_then_substring_search_with_type_glyphs() {
        let settings = Settings::default();
        assert_eq!(settings.search.mode, MatchMode::Substring);
        assert!(!settings.search.case_sensitive);
        assert!(settings.display.show_type);
        assert!(settings.source_file.is_none());
    }

    #[test]
    fn given_partial_overlay_when_merging_then_unspecified_fields_kept() {
        let base = Settings::default();
        let overlay: RawSettings = toml::from_str(
            r#"
[search]
mode = "regex"
"#,
        )
        .unwrap();

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.search.mode, MatchMode::Regex);
        assert!(!merged.search.case_sensitive);
        assert_eq!(merged.display, DisplayConfig::default());
    }

    #[test]
    fn given_tilde_in_source_file_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            source_file: Some(PathBuf::from("~/glossary.json")),
            ..Settings::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        let source = settings.source_file.unwrap();
        assert!(source.to_string_lossy().starts_with(&home));
    }

    #[test]
    fn given_settings_when_building_query_then_uses_configured_mode() {
        let mut settings = Settings::default();
        settings.search.mode = MatchMode::Regex;
        settings.search.case_sensitive = true;
        let query = settings.query("^Bill");
        assert_eq!(query.mode, MatchMode::Regex);
        assert!(query.case_sensitive);
    }

    #[test]
    fn given_template_when_parsed_then_is_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).unwrap();
        assert!(raw.source_file.is_none());
    }
}
