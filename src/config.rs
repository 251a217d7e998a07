// Configuration module
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Main service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub service: ServiceSettings,
    #[serde(default)]
    pub jobs: JobSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSettings {
    /// Worker id feeding the row id generator; must be unique per instance
    #[serde(default)]
    pub worker_id: u16,
    /// Default timeout applied to every backend statement, in seconds
    #[serde(default = "default_statement_timeout")]
    pub statement_timeout_secs: u64,
}

/// Bulk job settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSettings {
    /// How long a run waits for a per-table lock, in seconds
    #[serde(default = "default_lock_timeout")]
    pub lock_timeout_secs: u64,
    /// Tables considered stale when unused for this many days
    #[serde(default = "default_stale_days")]
    pub stale_after_days: u32,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_file")]
    pub file_path: String,
    #[serde(default = "default_true")]
    pub log_to_console: bool,
    /// "compact" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Per-target level overrides, e.g. `tdm_store = "debug"`
    #[serde(default)]
    pub targets: HashMap<String, String>,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        let config: AppConfig = toml::from_str(&raw)?;
        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service: ServiceSettings::default(),
            jobs: JobSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            worker_id: 0,
            statement_timeout_secs: default_statement_timeout(),
        }
    }
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            lock_timeout_secs: default_lock_timeout(),
            stale_after_days: default_stale_days(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_path: default_log_file(),
            log_to_console: default_true(),
            format: default_log_format(),
            targets: HashMap::new(),
        }
    }
}

fn default_statement_timeout() -> u64 {
    30
}

fn default_lock_timeout() -> u64 {
    30
}

fn default_stale_days() -> u32 {
    90
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/tdm-backend.log".to_string()
}

fn default_log_format() -> String {
    "compact".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.service.statement_timeout_secs, 30);
        assert_eq!(config.jobs.stale_after_days, 90);
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.log_to_console);
    }

    #[test]
    fn test_partial_toml_overrides() {
        let raw = r#"
            [service]
            worker_id = 7

            [jobs]
            lock_timeout_secs = 5

            [logging]
            level = "debug"
            format = "json"

            [logging.targets]
            tdm_store = "trace"
        "#;
        let config: AppConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.service.worker_id, 7);
        assert_eq!(config.jobs.lock_timeout_secs, 5);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.targets["tdm_store"], "trace");
    }
}
