// src/environment.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

const DEFAULT_API_URL: &str = "http://localhost:5000";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub run_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub max_poll_backoff_ms: u64,
    pub max_poll_failures: u32,
    pub simulation_step_ms: u64,
    pub simulation_intro_delay_ms: u64,
    pub storage_path: PathBuf,
    pub reports_dir: PathBuf,
    pub dashboard_port: u16,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: 30,
            run_timeout_secs: 10_800,
            poll_interval_ms: 2000,
            max_poll_backoff_ms: 30_000,
            max_poll_failures: 10,
            simulation_step_ms: 4000,
            simulation_intro_delay_ms: 1500,
            storage_path: PathBuf::from("data/local_storage.db"),
            reports_dir: PathBuf::from("reports"),
            dashboard_port: 8090,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    local: ClientConfig,
    #[serde(default)]
    production: ClientConfig,
}

impl ClientConfig {
    /// Load configuration for the current environment from `config.yaml`
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("config.yaml"))
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        let environment = Self::get_environment();
        info!("Loading configuration for environment: {}", environment);

        let config = if config_path.exists() {
            Self::load_from_file(config_path, &environment)?
        } else {
            info!(
                "{} not found, using built-in defaults",
                config_path.display()
            );
            Self::default()
        };

        let config = config.apply_env_overrides()?;
        Ok(Self {
            storage_path: Self::resolve_path(&config.storage_path)?,
            reports_dir: Self::resolve_path(&config.reports_dir)?,
            ..config
        })
    }

    fn get_environment() -> String {
        std::env::var("AUTOPILOT_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }

    fn load_from_file(config_path: &Path, environment: &str) -> Result<Self> {
        let config_content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        Self::parse(&config_content, environment)
    }

    fn parse(content: &str, environment: &str) -> Result<Self> {
        let config_file: ConfigFile =
            serde_yaml::from_str(content).context("Failed to parse config.yaml")?;

        Ok(match environment {
            "production" => config_file.production,
            _ => config_file.local,
        })
    }

    fn apply_env_overrides(mut self) -> Result<Self> {
        if let Ok(url) = std::env::var("AUTOPILOT_API_URL") {
            self.api_base_url = url;
        }
        if let Ok(interval) = std::env::var("AUTOPILOT_POLL_INTERVAL_MS") {
            self.poll_interval_ms = interval
                .parse()
                .context("AUTOPILOT_POLL_INTERVAL_MS must be a number of milliseconds")?;
        }
        if let Ok(port) = std::env::var("AUTOPILOT_DASHBOARD_PORT") {
            self.dashboard_port = port
                .parse()
                .context("AUTOPILOT_DASHBOARD_PORT must be a valid port number")?;
        }
        self.api_base_url = self.api_base_url.trim_end_matches('/').to_string();
        Ok(self)
    }

    fn resolve_path(path: &Path) -> Result<PathBuf> {
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            let current_dir = std::env::current_dir().context("Failed to get current directory")?;
            Ok(current_dir.join(path))
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn max_poll_backoff(&self) -> Duration {
        Duration::from_millis(self.max_poll_backoff_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs)
    }

    /// Ensure the storage and report directories exist
    pub async fn ensure_directories(&self) -> Result<()> {
        if let Some(parent) = self.storage_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        tokio::fs::create_dir_all(&self.reports_dir)
            .await
            .with_context(|| {
                format!("Failed to create directory: {}", self.reports_dir.display())
            })?;

        info!("All configured directories ensured to exist");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_selects_environment_section() {
        let yaml = r#"
local:
  api_base_url: "http://127.0.0.1:5000"
  poll_interval_ms: 500
production:
  api_base_url: "https://api.example.com"
"#;
        let local = ClientConfig::parse(yaml, "local").unwrap();
        assert_eq!(local.api_base_url, "http://127.0.0.1:5000");
        assert_eq!(local.poll_interval_ms, 500);
        assert_eq!(local.max_poll_failures, 10);

        let production = ClientConfig::parse(yaml, "production").unwrap();
        assert_eq!(production.api_base_url, "https://api.example.com");
        assert_eq!(production.poll_interval_ms, 2000);
    }

    #[test]
    fn test_run_timeout_is_separate_from_request_timeout() {
        let yaml = "local:\n  request_timeout_secs: 15\n  run_timeout_secs: 7200\n";
        let config = ClientConfig::parse(yaml, "local").unwrap();
        assert_eq!(config.request_timeout(), Duration::from_secs(15));
        assert_eq!(config.run_timeout(), Duration::from_secs(7200));

        let defaults = ClientConfig::parse("local: {}\n", "local").unwrap();
        assert!(defaults.run_timeout() > defaults.request_timeout());
    }

    #[test]
    fn test_unknown_environment_falls_back_to_local() {
        let yaml = "local:\n  dashboard_port: 9000\n";
        let config = ClientConfig::parse(yaml, "staging").unwrap();
        assert_eq!(config.dashboard_port, 9000);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::load_from(&dir.path().join("config.yaml")).unwrap();
        assert!(config.storage_path.is_absolute());
        assert_eq!(config.poll_interval(), Duration::from_secs(2));
    }
}
