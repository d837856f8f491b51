//! Application configuration module
//!
//! Configuration is read from an optional TOML file (path in
//! `STOREFRONT_CONFIG`) and then overridden by environment variables:
//!
//! | Variable               | Field                  |
//! |------------------------|------------------------|
//! | `SERVER_PORT`          | `server_port`          |
//! | `DATABASE_URL`         | `database_url`         |
//! | `STOREFRONT_CHANNELS`  | `channels` (comma-separated) |
//! | `STOREFRONT_WORKERS`   | `worker_pool_size`     |
//! | `DIGEST_INTERVAL_SECS` | `digest_interval_secs` |
//! | `MAIL_FROM`            | `mail_from`            |
//! | `SMTP_HOST`, `SMTP_PORT`, `SMTP_USERNAME`, `SMTP_PASSWORD` | `smtp` |

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_PATH_ENV: &str = "STOREFRONT_CONFIG";

/// SMTP relay settings for the digest mailer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SmtpConfig {
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

fn default_smtp_port() -> u16 {
    587
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listen port
    pub server_port: u16,
    /// PostgreSQL URL; the in-memory store is used when absent
    pub database_url: Option<String>,
    /// Notification channels created at startup
    pub channels: Vec<String>,
    /// Maximum concurrently running tasks per pool (each channel, the
    /// dispatcher and the digest each own one)
    pub worker_pool_size: usize,
    /// Seconds between digest runs
    pub digest_interval_secs: u64,
    /// Sender address of digest mails
    pub mail_from: String,
    /// SMTP relay; mails are only logged when absent
    pub smtp: Option<SmtpConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_port: 3000,
            database_url: None,
            channels: ["products", "categories", "orders", "users"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            worker_pool_size: 64,
            digest_interval_secs: 24 * 60 * 60,
            mail_from: "Storefront <noreply@storefront.local>".to_string(),
            smtp: None,
        }
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Load from the file named by `STOREFRONT_CONFIG` (if any), apply
    /// environment overrides and validate
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match env_var(CONFIG_PATH_ENV) {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file; missing fields take their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Override fields from environment variables that are set
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Some(port) = env_var("SERVER_PORT") {
            self.server_port = parse_value("SERVER_PORT", &port)?;
        }
        if let Some(url) = env_var("DATABASE_URL") {
            self.database_url = Some(url);
        }
        if let Some(channels) = env_var("STOREFRONT_CHANNELS") {
            self.channels = channels
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(workers) = env_var("STOREFRONT_WORKERS") {
            self.worker_pool_size = parse_value("STOREFRONT_WORKERS", &workers)?;
        }
        if let Some(interval) = env_var("DIGEST_INTERVAL_SECS") {
            self.digest_interval_secs = parse_value("DIGEST_INTERVAL_SECS", &interval)?;
        }
        if let Some(from) = env_var("MAIL_FROM") {
            self.mail_from = from;
        }
        if let Some(host) = env_var("SMTP_HOST") {
            let port = match env_var("SMTP_PORT") {
                Some(port) => parse_value("SMTP_PORT", &port)?,
                None => self.smtp.as_ref().map(|s| s.port).unwrap_or_else(default_smtp_port),
            };
            self.smtp = Some(SmtpConfig {
                host,
                port,
                username: env_var("SMTP_USERNAME"),
                password: env_var("SMTP_PASSWORD"),
            });
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channels.is_empty() {
            return Err(ConfigError::MissingValue("channels"));
        }
        let mut seen = std::collections::HashSet::new();
        for channel in &self.channels {
            if channel.trim().is_empty() || !seen.insert(channel.as_str()) {
                return Err(ConfigError::InvalidValue {
                    key: "channels",
                    value: channel.clone(),
                });
            }
        }
        if self.worker_pool_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "worker_pool_size",
                value: "0".to_string(),
            });
        }
        if self.digest_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "digest_interval_secs",
                value: "0".to_string(),
            });
        }
        if self.mail_from.trim().is_empty() {
            return Err(ConfigError::MissingValue("mail_from"));
        }
        Ok(())
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    pub fn server_port(mut self, port: u16) -> Self {
        self.config.server_port = port;
        self
    }

    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.config.database_url = Some(url.into());
        self
    }

    pub fn channels<I, S>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.channels = channels.into_iter().map(Into::into).collect();
        self
    }

    pub fn worker_pool_size(mut self, size: usize) -> Self {
        self.config.worker_pool_size = size;
        self
    }

    pub fn digest_interval_secs(mut self, secs: u64) -> Self {
        self.config.digest_interval_secs = secs;
        self
    }

    pub fn mail_from(mut self, from: impl Into<String>) -> Self {
        self.config.mail_from = from.into();
        self
    }

    pub fn smtp(mut self, smtp: SmtpConfig) -> Self {
        self.config.smtp = Some(smtp);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("missing value: {0}")]
    MissingValue(&'static str),
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_value<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
    })
}
