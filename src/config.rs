use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use url::Url;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

/// Graph-explorer backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the backend surface, e.g. `http://localhost:8000/api/graph`.
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Session persistence configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Where the single session record lives.
    #[serde(default = "default_session_path")]
    pub path: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig { path: default_session_path() }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_session_path() -> PathBuf {
    PathBuf::from(".graphlens-session.json")
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in GRAPHLENS_CONFIG environment variable
    /// 2. ./config.toml in current directory
    pub fn load() -> Result<Self> {
        // Load .env file if it exists (ignore errors - file is optional)
        let _ = dotenv::dotenv();

        let config_path = std::env::var("GRAPHLENS_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        let config_str = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Config = toml::from_str(&config_str)
            .context("Failed to parse config.toml")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        Url::parse(&self.server.base_url).with_context(|| {
            format!(
                "server.base_url is not a valid URL: {}. Set it to your graph-explorer backend, e.g. http://localhost:8000/api/graph",
                self.server.base_url
            )
        })?;

        if self.server.timeout_secs == 0 {
            anyhow::bail!("server.timeout_secs must be greater than 0");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Serialize config tests that mutate process-wide env so they don't race.
    static CONFIG_TEST_LOCK: Mutex<()> = Mutex::new(());

    fn with_config_file(content: &str, f: impl FnOnce(Result<Config>)) {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, content).unwrap();

        let original = std::env::var("GRAPHLENS_CONFIG").ok();
        std::env::set_var("GRAPHLENS_CONFIG", config_path.to_str().unwrap());
        f(Config::load());
        std::env::remove_var("GRAPHLENS_CONFIG");
        if let Some(val) = original {
            std::env::set_var("GRAPHLENS_CONFIG", val);
        }
    }

    #[test]
    fn test_config_load_success() {
        with_config_file(
            r#"
[server]
base_url = "http://localhost:8000/api/graph"
timeout_secs = 10
log_level = "debug"

[session]
path = "./session.json"
"#,
            |config| {
                let config = config.expect("Config::load() failed");
                assert_eq!(config.server.base_url, "http://localhost:8000/api/graph");
                assert_eq!(config.server.timeout_secs, 10);
                assert_eq!(config.server.log_level, "debug");
                assert_eq!(config.session.path, PathBuf::from("./session.json"));
            },
        );
    }

    #[test]
    fn test_config_defaults() {
        with_config_file(
            r#"
[server]
base_url = "http://localhost:8000/api/graph"
"#,
            |config| {
                let config = config.unwrap();
                assert_eq!(config.server.timeout_secs, 30);
                assert_eq!(config.server.log_level, "info");
                assert_eq!(config.session.path, PathBuf::from(".graphlens-session.json"));
            },
        );
    }

    #[test]
    fn test_config_rejects_bad_base_url() {
        with_config_file(
            r#"
[server]
base_url = "not a url"
"#,
            |config| {
                let err = config.unwrap_err();
                assert!(err.to_string().contains("base_url"));
            },
        );
    }

    #[test]
    fn test_config_rejects_zero_timeout() {
        with_config_file(
            r#"
[server]
base_url = "http://localhost:8000"
timeout_secs = 0
"#,
            |config| {
                let err = config.unwrap_err();
                assert!(err.to_string().contains("timeout_secs"));
            },
        );
    }

    #[test]
    fn test_config_invalid_path() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let original = std::env::var("GRAPHLENS_CONFIG").ok();
        std::env::set_var("GRAPHLENS_CONFIG", "nonexistent.toml");
        let config = Config::load();
        assert!(config.is_err());
        std::env::remove_var("GRAPHLENS_CONFIG");
        if let Some(v) = original {
            std::env::set_var("GRAPHLENS_CONFIG", v);
        }
    }
}
