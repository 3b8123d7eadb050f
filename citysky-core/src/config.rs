use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}, time::Duration};

use crate::model::Units;

/// Environment variable that overrides the stored access key.
pub const ACCESS_KEY_ENV: &str = "CITYSKY_ACCESS_KEY";

pub const DEFAULT_BASE_URL: &str = "http://api.weatherstack.com";
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// access_key = "..."
/// units = "metric"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// weatherstack access key. Never compiled in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub units: Units,

    /// Quiet period before a suggestion lookup is sent.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            access_key: None,
            base_url: default_base_url(),
            units: Units::default(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet,
    /// then apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let cfg = Self::load_from(&path)?;

        Ok(cfg.with_env_overrides(|name| std::env::var(name).ok()))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// A non-empty `CITYSKY_ACCESS_KEY` replaces the stored key.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = lookup(ACCESS_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.access_key = Some(key);
        }
        self
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "citysky", "citysky")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Directory for log files written while the interactive view owns the terminal.
    pub fn log_dir() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.data_local_dir().join("logs"))
    }

    pub fn set_access_key(&mut self, api_key: String) {
        self.access_key = Some(api_key);
    }

    /// Returns the access key or an error telling the user how to provide one.
    pub fn access_key(&self) -> Result<&str> {
        self.access_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No access key configured.\n\
                     Hint: run `citysky configure` or set {ACCESS_KEY_ENV}."
                )
            })
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("citysky-config-test-{}-{name}", std::process::id()))
            .join("config.toml")
    }

    #[test]
    fn access_key_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.access_key().unwrap_err();

        assert!(err.to_string().contains("No access key configured"));
        assert!(err.to_string().contains("citysky configure"));
    }

    #[test]
    fn blank_access_key_counts_as_missing() {
        let mut cfg = Config::default();
        cfg.set_access_key("   ".into());
        assert!(cfg.access_key().is_err());
    }

    #[test]
    fn defaults_apply_to_sparse_file() {
        let cfg: Config = toml::from_str(r#"access_key = "KEY""#).unwrap();

        assert_eq!(cfg.access_key().unwrap(), "KEY");
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.units, Units::Metric);
        assert_eq!(cfg.debounce(), Duration::from_millis(500));
    }

    #[test]
    fn env_override_replaces_stored_key() {
        let mut cfg = Config::default();
        cfg.set_access_key("FILE_KEY".into());

        let cfg = cfg.with_env_overrides(|name| {
            (name == ACCESS_KEY_ENV).then(|| "ENV_KEY".to_string())
        });
        assert_eq!(cfg.access_key().unwrap(), "ENV_KEY");
    }

    #[test]
    fn empty_env_override_is_ignored() {
        let mut cfg = Config::default();
        cfg.set_access_key("FILE_KEY".into());

        let cfg = cfg.with_env_overrides(|_| Some(String::new()));
        assert_eq!(cfg.access_key().unwrap(), "FILE_KEY");
    }

    #[test]
    fn missing_file_loads_defaults() {
        let cfg = Config::load_from(&scratch_path("missing")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_then_load_from_disk() {
        let path = scratch_path("save");
        let mut cfg = Config { units: Units::Fahrenheit, ..Config::default() };
        cfg.set_access_key("SAVED".into());

        cfg.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        let _ = fs::remove_dir_all(path.parent().unwrap());

        assert_eq!(loaded, cfg);
    }

    #[test]
    fn unparsable_file_reports_path() {
        let path = scratch_path("broken");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "units = [").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        let _ = fs::remove_dir_all(path.parent().unwrap());

        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
