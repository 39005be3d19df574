//! Persistent host configuration model and file-backed manager.

use chrono::{FixedOffset, Offset, Utc};
use jira_worklog::config::{DEFAULT_COOLDOWN_MS, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_MAX_CHART_DAYS};
use jira_worklog::{BurndownOptions, JiraConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

const MAX_OFFSET_MINUTES: i32 = 14 * 60;

fn default_request_cooldown_ms() -> u64 {
    DEFAULT_COOLDOWN_MS
}

fn default_fetch_timeout_secs() -> u64 {
    DEFAULT_FETCH_TIMEOUT_SECS
}

fn default_max_chart_days() -> usize {
    DEFAULT_MAX_CHART_DAYS
}

/// Which endpoint work logs are read from when no tab href is given.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum WorklogSourceSetting {
    Timesheet,
    #[default]
    IssueTab,
}

/// Host settings persisted on disk: where Jira lives and how gently to query it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Config {
    pub base_url: Option<String>,
    pub worklog_source: WorklogSourceSetting,
    #[serde(default = "default_request_cooldown_ms")]
    pub request_cooldown_ms: u64,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_max_chart_days")]
    pub max_chart_days: usize,
    pub utc_offset_minutes: i32,
}

impl Default for Config {
    /// Returns baseline config when no persisted settings are available.
    fn default() -> Self {
        Self {
            base_url: None,
            worklog_source: WorklogSourceSetting::default(),
            request_cooldown_ms: default_request_cooldown_ms(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            max_chart_days: default_max_chart_days(),
            utc_offset_minutes: 0,
        }
    }
}

impl Config {
    /// Replaces out-of-range values with usable ones.
    pub fn normalized(mut self) -> Self {
        if self.fetch_timeout_secs == 0 {
            self.fetch_timeout_secs = default_fetch_timeout_secs();
        }
        if self.max_chart_days == 0 {
            self.max_chart_days = default_max_chart_days();
        }
        self.utc_offset_minutes = self
            .utc_offset_minutes
            .clamp(-MAX_OFFSET_MINUTES, MAX_OFFSET_MINUTES);
        self.base_url = self
            .base_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());
        self
    }

    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }

    pub fn jira_config(&self, base_url: &str) -> JiraConfig {
        JiraConfig::new(base_url)
            .with_cooldown(Duration::from_millis(self.request_cooldown_ms))
            .with_fetch_timeout(Duration::from_secs(self.fetch_timeout_secs))
            .with_utc_offset(self.utc_offset())
    }

    pub fn burndown_options(&self) -> BurndownOptions {
        BurndownOptions {
            max_days: self.max_chart_days,
            utc_offset: self.utc_offset(),
        }
    }
}

/// Loads and saves the JSON config file in the platform-specific config directory.
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, String> {
        let dirs = directories::ProjectDirs::from("io", "jira-burndown", "jira-burndown")
            .ok_or_else(|| "Could not determine config directory".to_string())?;
        let path = dirs.config_dir().join("config.json");
        Ok(Self { path })
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Loads config from disk, falling back to defaults on read/parse errors.
    pub fn load(&self) -> Config {
        let config = if self.path.exists() {
            let content = fs::read_to_string(&self.path).unwrap_or_default();
            serde_json::from_str(&content).unwrap_or_else(|err| {
                log::warn!("Ignoring unreadable config {}: {}", self.path.display(), err);
                Config::default()
            })
        } else {
            Config::default()
        };
        config.normalized()
    }

    /// Persists config to disk, creating parent directories when needed.
    pub fn save(&self, config: &Config) -> Result<(), std::io::Error> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_path(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        env::temp_dir().join(format!("jira-burndown-tests-{name}-{nanos}/config.json"))
    }

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert_eq!(config.base_url, None);
        assert_eq!(config.worklog_source, WorklogSourceSetting::IssueTab);
        assert_eq!(config.request_cooldown_ms, 250);
        assert_eq!(config.fetch_timeout_secs, 30);
        assert_eq!(config.max_chart_days, 50);
        assert_eq!(config.utc_offset_minutes, 0);
    }

    #[test]
    fn empty_json_object_matches_defaults() {
        let config: Config = serde_json::from_str("{}").expect("empty object should decode");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn load_missing_file_returns_default() {
        let manager = ConfigManager::with_path(unique_path("missing"));
        assert_eq!(manager.load(), Config::default());
    }

    #[test]
    fn save_and_load_round_trip() {
        let path = unique_path("roundtrip");
        let parent = path.parent().map(ToOwned::to_owned);

        let manager = ConfigManager::with_path(path.clone());
        let config = Config {
            base_url: Some("https://jira.example.com".to_string()),
            worklog_source: WorklogSourceSetting::Timesheet,
            request_cooldown_ms: 100,
            fetch_timeout_secs: 12,
            max_chart_days: 20,
            utc_offset_minutes: 120,
        };

        manager.save(&config).expect("save should succeed");
        assert_eq!(manager.load(), config);

        if let Some(parent) = parent {
            let _ = fs::remove_dir_all(parent);
        }
    }

    #[test]
    fn load_invalid_json_falls_back_to_default() {
        let path = unique_path("invalid");
        let parent = path.parent().expect("parent must exist");
        fs::create_dir_all(parent).expect("create temp directory");
        fs::write(&path, "not-valid-json").expect("write invalid config");

        let manager = ConfigManager::with_path(path.clone());
        assert_eq!(manager.load(), Config::default());

        let _ = fs::remove_dir_all(parent);
    }

    #[test]
    fn normalization_repairs_out_of_range_values() {
        let config = Config {
            base_url: Some("   ".to_string()),
            fetch_timeout_secs: 0,
            max_chart_days: 0,
            utc_offset_minutes: 10_000,
            ..Config::default()
        }
        .normalized();

        assert_eq!(config.base_url, None);
        assert_eq!(config.fetch_timeout_secs, 30);
        assert_eq!(config.max_chart_days, 50);
        assert_eq!(config.utc_offset_minutes, 14 * 60);
        assert_eq!(config.utc_offset().local_minus_utc(), 14 * 3600);
    }

    #[test]
    fn settings_flow_into_library_config() {
        let config = Config {
            request_cooldown_ms: 0,
            utc_offset_minutes: -300,
            max_chart_days: 10,
            ..Config::default()
        };
        let jira = config.jira_config("https://jira.example.com");
        assert_eq!(jira.cooldown, Duration::ZERO);
        assert_eq!(jira.utc_offset.local_minus_utc(), -5 * 3600);
        assert_eq!(config.burndown_options().max_days, 10);
    }
}
