//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::lenient;
use crate::core::Workspace;

/// Lifetime used when neither the command line nor any config sets one
pub const DEFAULT_LIFETIME: f64 = 100_000.0;

/// FMEDA configuration with layered hierarchy
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default output format
    pub default_format: Option<String>,

    /// Lifetime in hours for new projects
    pub default_lifetime: Option<f64>,

    /// Whether CSV exports include metric columns
    pub export_metrics: Option<bool>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    ///
    /// The workspace layer is skipped when `workspace` is `None`.
    pub fn load_for(workspace: Option<&Workspace>) -> Self {
        let mut config = Config::default();

        // 1. Global user config (~/.config/fmeda/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read(&global_path) {
                config.merge(global);
            }
        }

        // 2. Workspace config (.fmeda/config.yaml)
        if let Some(workspace) = workspace {
            if let Some(local) = Self::read(&workspace.config_path()) {
                config.merge(local);
            }
        }

        // 3. Environment variables
        if let Ok(format) = std::env::var("FMEDA_FORMAT") {
            config.default_format = Some(format);
        }
        if let Ok(lifetime) = std::env::var("FMEDA_LIFETIME") {
            config.default_lifetime = Some(lenient::parse_f64(&lifetime));
        }

        config
    }

    fn read(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        // The generated file is all comments
        let is_blank = contents
            .lines()
            .map(str::trim)
            .all(|l| l.is_empty() || l.starts_with('#'));
        if is_blank {
            return None;
        }
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                None
            }
        }
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "fmeda")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        if other.default_lifetime.is_some() {
            self.default_lifetime = other.default_lifetime;
        }
        if other.export_metrics.is_some() {
            self.export_metrics = other.export_metrics;
        }
    }

    pub fn lifetime(&self) -> f64 {
        self.default_lifetime.unwrap_or(DEFAULT_LIFETIME)
    }

    pub fn export_metrics(&self) -> bool {
        self.export_metrics.unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_prefers_later_layer() {
        let mut config = Config {
            default_format: Some("yaml".to_string()),
            default_lifetime: Some(1000.0),
            export_metrics: None,
        };
        config.merge(Config {
            default_format: None,
            default_lifetime: Some(8760.0),
            export_metrics: Some(false),
        });
        assert_eq!(config.default_format.as_deref(), Some("yaml"));
        assert_eq!(config.lifetime(), 8760.0);
        assert!(!config.export_metrics());
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.lifetime(), DEFAULT_LIFETIME);
        assert!(config.export_metrics());
    }

    #[test]
    fn test_workspace_config_is_read() {
        let tmp = tempfile::tempdir().unwrap();
        let ws = Workspace::init(tmp.path()).unwrap();
        std::fs::write(ws.config_path(), "default_lifetime: 5000\nexport_metrics: false\n")
            .unwrap();

        let config = Config::read(&ws.config_path()).unwrap();
        assert_eq!(config.default_lifetime, Some(5000.0));
        assert_eq!(config.export_metrics, Some(false));
    }

    #[test]
    fn test_generated_config_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let ws = Workspace::init(tmp.path()).unwrap();
        assert!(Config::read(&ws.config_path()).is_none());
    }
}
