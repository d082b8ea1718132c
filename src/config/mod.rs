//! Configuration management
//!
//! YAML-based configuration with environment variable overrides and default
//! values for every setting.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5080
}

fn default_workers() -> usize {
    num_cpus::get()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: default_workers(),
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "default_token_expiry")]
    pub token_expiry_hours: u64,
    #[serde(default = "default_password_min_length")]
    pub password_min_length: usize,
}

fn default_token_expiry() -> u64 {
    24
}

fn default_password_min_length() -> usize {
    8
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_connect_timeout() -> u64 {
    30
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
    /// Log output target (console or file)
    #[serde(default)]
    pub target: LogTarget,
    /// Directory for log files (used when target is "file")
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    #[serde(default = "default_log_prefix")]
    pub log_prefix: String,
    #[serde(default = "default_log_rotation")]
    pub daily_rotation: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("/var/log/opsdesk")
}

fn default_log_prefix() -> String {
    "opsdesk".to_string()
}

fn default_log_rotation() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            target: LogTarget::default(),
            log_dir: default_log_dir(),
            log_prefix: default_log_prefix(),
            daily_rotation: default_log_rotation(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

/// Log output target
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    #[default]
    Console,
    File,
    Both,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            auth: AuthConfig {
                jwt_secret: "change-me-in-production-minimum-32-characters-long".to_string(),
                token_expiry_hours: default_token_expiry(),
                password_min_length: default_password_min_length(),
            },
            database: DatabaseConfig {
                url: "sqlite://./data/opsdesk.db".to_string(),
                max_connections: default_max_connections(),
                connect_timeout_secs: default_connect_timeout(),
            },
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values
    /// 2. Configuration file (YAML)
    /// 3. Environment variables (prefixed with OPSDESK_)
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let config_path = std::env::var("OPSDESK_CONFIG")
            .map(PathBuf::from)
            .ok()
            .or_else(Self::find_config_file);

        let mut config = if let Some(ref path) = config_path {
            if path.exists() {
                let contents = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file: {:?}", path))?;
                serde_norway::from_str(&contents)
                    .with_context(|| format!("Failed to parse config file: {:?}", path))?
            } else {
                AppConfig::default()
            }
        } else {
            AppConfig::default()
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Find the configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let paths = [
            PathBuf::from("config.yaml"),
            PathBuf::from("config/config.yaml"),
            PathBuf::from("/etc/opsdesk/config.yaml"),
            dirs::config_dir()
                .map(|p| p.join("opsdesk/config.yaml"))
                .unwrap_or_default(),
        ];

        paths.into_iter().find(|p| p.exists())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("OPSDESK_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("OPSDESK_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }

        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.database.url = url;
        }

        if let Ok(secret) = std::env::var("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("OPSDESK_LOG_FORMAT") {
            self.logging.format = match format.to_lowercase().as_str() {
                "json" => LogFormat::Json,
                "compact" => LogFormat::Compact,
                _ => LogFormat::Pretty,
            };
        }
        if let Ok(target) = std::env::var("OPSDESK_LOG_TARGET") {
            self.logging.target = match target.to_lowercase().as_str() {
                "file" => LogTarget::File,
                "both" => LogTarget::Both,
                _ => LogTarget::Console,
            };
        }
        if let Ok(dir) = std::env::var("OPSDESK_LOG_DIR") {
            self.logging.log_dir = PathBuf::from(dir);
        }
    }

    /// Validate the loaded configuration
    fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.auth.jwt_secret.len() >= 32,
            "auth.jwt_secret must be at least 32 characters"
        );
        anyhow::ensure!(
            !self.database.url.is_empty(),
            "database.url must not be empty"
        );
        Ok(())
    }
}
