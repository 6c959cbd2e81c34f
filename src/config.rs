use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::session::attempt::SessionOptions;

pub const APP_DIR: &str = "diffdrill";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Catalogue,
    Remote,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub problem_source: SourceKind,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_skip_cooldown_ms")]
    pub skip_cooldown_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_theme() -> String {
    "terminal-default".to_string()
}
fn default_api_url() -> String {
    "http://localhost:8000".to_string()
}
fn default_tick_interval_ms() -> u64 {
    100
}
fn default_skip_cooldown_ms() -> u64 {
    1000
}
fn default_request_timeout_secs() -> u64 {
    10
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            problem_source: SourceKind::default(),
            api_url: default_api_url(),
            session_id: None,
            tick_interval_ms: default_tick_interval_ms(),
            skip_cooldown_ms: default_skip_cooldown_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Missing files yield defaults; unreadable or malformed ones are errors.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let mut config: Config =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        config.normalize();
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("config.toml")
    }

    pub fn themes_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("themes")
    }

    pub fn default_log_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("diffdrill.log")
    }

    /// Clamp values that would make the session misbehave. Call after
    /// deserialization or after applying CLI overrides.
    pub fn normalize(&mut self) {
        // Zero disables the ticker; anything faster than 10ms just burns CPU.
        if self.tick_interval_ms != 0 {
            self.tick_interval_ms = self.tick_interval_ms.clamp(10, 5_000);
        }
        self.skip_cooldown_ms = self.skip_cooldown_ms.min(60_000);
        self.request_timeout_secs = self.request_timeout_secs.clamp(1, 300);
        if self.api_url.trim().is_empty() {
            self.api_url = default_api_url();
        }
        if self.session_id.as_deref().is_some_and(|id| id.trim().is_empty()) {
            self.session_id = None;
        }
        if self.log_level.trim().is_empty() {
            self.log_level = default_log_level();
        }
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            tick_interval: (self.tick_interval_ms > 0)
                .then(|| Duration::from_millis(self.tick_interval_ms)),
            skip_cooldown: Duration::from_millis(self.skip_cooldown_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.problem_source, SourceKind::Catalogue);
        assert_eq!(config.api_url, "http://localhost:8000");
        assert_eq!(config.session_id, None);
        assert_eq!(config.tick_interval_ms, 100);
        assert_eq!(config.skip_cooldown_ms, 1000);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_config_partial_file_keeps_other_defaults() {
        let toml_str = r#"
theme = "catppuccin-mocha"
problem_source = "remote"
session_id = "abc123"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.theme, "catppuccin-mocha");
        assert_eq!(config.problem_source, SourceKind::Remote);
        assert_eq!(config.session_id.as_deref(), Some("abc123"));
        assert_eq!(config.request_timeout_secs, 10);
    }

    #[test]
    fn test_unknown_source_is_rejected() {
        assert!(toml::from_str::<Config>("problem_source = \"ftp\"").is_err());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.theme, "terminal-default");
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.api_url = "https://drill.example.org".into();
        config.skip_cooldown_ms = 250;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api_url, "https://drill.example.org");
        assert_eq!(loaded.skip_cooldown_ms, 250);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "tick_interval_ms = \"fast\"").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("parsing"));
    }

    #[test]
    fn test_normalize_clamps_values() {
        let mut config = Config {
            tick_interval_ms: 1,
            request_timeout_secs: 0,
            session_id: Some("  ".into()),
            api_url: String::new(),
            ..Config::default()
        };
        config.normalize();
        assert_eq!(config.tick_interval_ms, 10);
        assert_eq!(config.request_timeout_secs, 1);
        assert_eq!(config.session_id, None);
        assert_eq!(config.api_url, "http://localhost:8000");
    }

    #[test]
    fn test_zero_tick_interval_disables_ticker() {
        let mut config = Config {
            tick_interval_ms: 0,
            ..Config::default()
        };
        config.normalize();
        let options = config.session_options();
        assert!(options.tick_interval.is_none());
        assert_eq!(options.skip_cooldown, Duration::from_secs(1));
    }
}
