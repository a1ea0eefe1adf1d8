use anyhow::{Context, Result};
use serde::Deserialize;
use watchpost_notify::SmtpConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    #[serde(default)]
    pub database: DatabaseConfig,

    /// Shared secret for `GET /api/cron/evaluate-alerts`. The route rejects
    /// every request while this is unset.
    #[serde(default)]
    pub cron_token: Option<String>,

    /// SMTP transport for alert email. Omit the section to disable mail.
    #[serde(default)]
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl DatabaseConfig {
    pub fn connection_url(&self) -> String {
        format!("sqlite://{}?mode=rwc", self.path)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
            database: DatabaseConfig::default(),
            cron_token: None,
            smtp: None,
        }
    }
}

impl ServerConfig {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{path}'"))?;
        let config: ServerConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file '{path}'"))?;
        Ok(config)
    }
}

fn default_http_port() -> u16 {
    8080
}

fn default_db_path() -> String {
    "data/watchpost.db".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_gets_defaults() {
        let config: ServerConfig = toml::from_str("").unwrap();
        assert_eq!(config.http_port, 8080);
        assert!(config.database.connection_url().starts_with("sqlite://data/"));
        assert!(config.cron_token.is_none());
        assert!(config.smtp.is_none());
    }

    #[test]
    fn full_config_parses() {
        let config: ServerConfig = toml::from_str(
            r#"
http_port = 9000
cron_token = "s3cret"

[database]
path = "/var/lib/watchpost/db.sqlite"

[smtp]
host = "smtp.example.com"
from = "alerts@example.com"
username = "alerts"
password = "hunter2"
recipients = ["ops@example.com"]
"#,
        )
        .unwrap();
        assert_eq!(config.http_port, 9000);
        assert_eq!(config.cron_token.as_deref(), Some("s3cret"));
        let smtp = config.smtp.unwrap();
        assert_eq!(smtp.port, 587);
        assert_eq!(smtp.recipients, vec!["ops@example.com".to_string()]);
    }
}
