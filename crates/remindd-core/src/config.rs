use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_BIND: &str = "127.0.0.1";
/// Delivery poll cadence when none is configured.
pub const DEFAULT_POLL_SECS: u64 = 300;
/// STARTTLS submission port.
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Top-level config (remindd.toml + REMINDD_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemindConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub smtp: SmtpConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Outbound SMTP relay settings.
///
/// `username`/`password` may be left out for unauthenticated relays
/// (e.g. a local dev catcher on port 1025).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    #[serde(default = "default_smtp_host")]
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// RFC 5322 mailbox used as the From header,
    /// e.g. `Remindd <no-reply@example.org>`.
    #[serde(default = "default_from")]
    pub from: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: default_smtp_host(),
            port: default_smtp_port(),
            username: None,
            password: None,
            from: default_from(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Seconds between delivery cycles.
    #[serde(default = "default_poll_secs")]
    pub interval_secs: u64,
    /// Maximum records processed per cycle. None means unbounded.
    #[serde(default)]
    pub batch_limit: Option<u32>,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_poll_secs(),
            batch_limit: None,
        }
    }
}

impl RemindConfig {
    /// Load config from `config_path`, falling back to
    /// `~/.remindd/remindd.toml`, with `REMINDD_*` env vars overriding
    /// file values. A missing file yields the defaults.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: RemindConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("REMINDD_").split("_"))
            .extract()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.remindd/remindd.toml", home)
}

fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.remindd/remindd.db", home)
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_smtp_host() -> String {
    "localhost".to_string()
}

fn default_smtp_port() -> u16 {
    DEFAULT_SMTP_PORT
}

fn default_from() -> String {
    "Remindd <remindd@localhost>".to_string()
}

fn default_poll_secs() -> u64 {
    DEFAULT_POLL_SECS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = RemindConfig::default();
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.server.bind, DEFAULT_BIND);
        assert_eq!(config.delivery.interval_secs, DEFAULT_POLL_SECS);
        assert!(config.delivery.batch_limit.is_none());
        assert!(config.smtp.username.is_none());
    }

    #[test]
    fn toml_overrides_defaults() {
        let config: RemindConfig = Figment::new()
            .merge(Toml::string(
                r#"
                [server]
                port = 8080

                [smtp]
                host = "smtp.example.org"
                username = "bot"
                password = "hunter2"
                from = "Remindd <reminders@example.org>"

                [delivery]
                interval_secs = 60
                batch_limit = 5
                "#,
            ))
            .extract()
            .expect("extract failed");

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.bind, DEFAULT_BIND);
        assert_eq!(config.smtp.host, "smtp.example.org");
        assert_eq!(config.smtp.port, DEFAULT_SMTP_PORT);
        assert_eq!(config.smtp.username.as_deref(), Some("bot"));
        assert_eq!(config.delivery.interval_secs, 60);
        assert_eq!(config.delivery.batch_limit, Some(5));
    }
}
