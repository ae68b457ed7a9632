use serde::Deserialize;
use std::time::Duration;
use std::{fs::File, io::Read, path::Path};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to open config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ConfigError {
    pub fn error_code(&self) -> &'static str {
        use crate::errors::codes::ErrorCode;

        match self {
            ConfigError::Io(_) => ErrorCode::CONFIG_READ_FAILED,
            ConfigError::Yaml(_) => ErrorCode::CONFIG_PARSE_FAILED,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

/// How the API server launches containers through the engine.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    pub image: String,
    pub index_html: String,
    pub published_port: String,
    pub stop_timeout_secs: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            image: "nginx:latest".to_string(),
            index_html: "nginx/index.html".to_string(),
            published_port: "80/tcp".to_string(),
            stop_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct DashboardConfig {
    pub api_base_url: String,
    /// Host used to build port links. Falls back to the host of `api_base_url`.
    pub public_host: Option<String>,
    pub success_clear_ms: u64,
    pub id_prefix_len: usize,
    pub discard_stale_refreshes: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:5000".to_string(),
            public_host: None,
            success_clear_ms: 3000,
            id_prefix_len: 12,
            discard_stale_refreshes: false,
        }
    }
}

impl DashboardConfig {
    pub fn success_clear_delay(&self) -> Duration {
        Duration::from_millis(self.success_clear_ms)
    }

    pub fn link_host(&self) -> String {
        if let Some(host) = &self.public_host {
            return host.clone();
        }

        reqwest::Url::parse(&self.api_base_url)
            .ok()
            .and_then(|url| url.host_str().map(String::from))
            .unwrap_or_else(|| "localhost".to_string())
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct TelemetryConfig {
    pub enabled: bool,
    pub service_name: String,
    pub otlp_endpoint: String,
    pub log_level: String,
    pub excluded_modules: Vec<String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            service_name: "dockpanel".to_string(),
            otlp_endpoint: "http://localhost:4317".to_string(),
            log_level: "info".to_string(),
            excluded_modules: vec![],
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut file: File = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Reads `path` when it exists, otherwise returns the built-in defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn given_valid_yaml_when_loaded_then_config_is_parsed_correctly() {
        let yaml = r#"
server:
  host: 127.0.0.1
  port: 8080
engine:
  image: nginx:1.27
  index_html: /srv/www/index.html
dashboard:
  api_base_url: http://panel.local:8080
  success_clear_ms: 1500
  discard_stale_refreshes: true
"#;
        let mut tmpfile = NamedTempFile::new().unwrap();
        write!(tmpfile, "{}", yaml).unwrap();

        let config = Config::from_file(tmpfile.path());

        assert!(config.is_ok());
        let config = config.unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.engine.image, "nginx:1.27");
        assert_eq!(config.engine.index_html, "/srv/www/index.html");
        assert_eq!(config.engine.published_port, "80/tcp");
        assert_eq!(config.dashboard.api_base_url, "http://panel.local:8080");
        assert_eq!(config.dashboard.success_clear_ms, 1500);
        assert_eq!(config.dashboard.id_prefix_len, 12);
        assert!(config.dashboard.discard_stale_refreshes);
        assert!(!config.telemetry.enabled);
    }

    #[test]
    fn given_invalid_yaml_when_loaded_then_returns_error() {
        let yaml = "not: valid: yaml";
        let mut tmpfile = NamedTempFile::new().unwrap();
        write!(tmpfile, "{}", yaml).unwrap();

        let config = Config::from_file(tmpfile.path());

        assert!(config.is_err());
        assert_eq!(config.unwrap_err().error_code(), "C101");
    }

    #[test]
    fn given_missing_file_when_load_or_default_then_defaults_are_used() {
        let dir = tempfile::tempdir().unwrap();

        let config = Config::load_or_default(dir.path().join("absent.yaml")).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.dashboard.success_clear_delay(), Duration::from_secs(3));
    }

    #[test]
    fn given_no_public_host_when_link_host_then_api_host_is_used() {
        let dashboard = DashboardConfig {
            api_base_url: "http://10.0.0.7:5000".to_string(),
            ..Default::default()
        };

        assert_eq!(dashboard.link_host(), "10.0.0.7");
    }

    #[test]
    fn given_public_host_when_link_host_then_it_wins() {
        let dashboard = DashboardConfig {
            public_host: Some("panel.example".to_string()),
            ..Default::default()
        };

        assert_eq!(dashboard.link_host(), "panel.example");
    }
}
