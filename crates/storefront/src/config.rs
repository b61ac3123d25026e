//! Configuration loading

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use storefront_auth::jwt::MAX_TOKEN_TTL_SECS;
use tracing::{info, warn};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

/// Database configuration
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

/// Authentication variant served by the process
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthModeConfig {
    Basic,
    #[default]
    Jwt,
}

impl fmt::Display for AuthModeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthModeConfig::Basic => write!(f, "basic"),
            AuthModeConfig::Jwt => write!(f, "jwt"),
        }
    }
}

impl FromStr for AuthModeConfig {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "basic" => Ok(AuthModeConfig::Basic),
            "jwt" => Ok(AuthModeConfig::Jwt),
            _ => bail!("Unknown auth mode '{}', expected 'basic' or 'jwt'", s),
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub mode: AuthModeConfig,
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: i64,
    /// Static username/password table for the Basic variant
    #[serde(default = "default_basic_users")]
    pub basic_users: HashMap<String, String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            mode: AuthModeConfig::default(),
            jwt_secret: default_jwt_secret(),
            token_ttl_secs: default_token_ttl_secs(),
            basic_users: default_basic_users(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MetricsConfig {
    #[serde(default)]
    pub enabled: bool,
}

// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_db_path() -> String {
    "./data/storefront.db".to_string()
}

fn default_jwt_secret() -> String {
    "change-me-in-production".to_string()
}

fn default_token_ttl_secs() -> i64 {
    storefront_auth::jwt::DEFAULT_TOKEN_TTL_SECS
}

fn default_basic_users() -> HashMap<String, String> {
    HashMap::from([("user123".to_string(), "password123".to_string())])
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &str) -> Result<Self> {
        let config_path = Path::new(path);

        // Check if config file exists
        if !config_path.exists() {
            info!("Config file not found at {}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        config.validate()?;

        info!("Loaded configuration from {}", path);
        Ok(config)
    }

    /// Reject settings the services cannot run with
    pub fn validate(&self) -> Result<()> {
        match self.auth.mode {
            AuthModeConfig::Jwt => {
                if self.auth.jwt_secret.is_empty() {
                    bail!("auth.jwt_secret must not be empty");
                }
                if !(1..=MAX_TOKEN_TTL_SECS).contains(&self.auth.token_ttl_secs) {
                    bail!(
                        "auth.token_ttl_secs must be between 1 and {}, got {}",
                        MAX_TOKEN_TTL_SECS,
                        self.auth.token_ttl_secs
                    );
                }
                if self.auth.jwt_secret == default_jwt_secret() {
                    warn!("Using the default JWT secret; set auth.jwt_secret in production");
                }
            }
            AuthModeConfig::Basic => {
                if self.auth.basic_users.is_empty() {
                    warn!("auth.basic_users is empty; the product listing will reject everyone");
                }
            }
        }
        Ok(())
    }

    /// sqlx connection URL for the configured database file
    pub fn database_url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.database.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.auth.mode, AuthModeConfig::Jwt);
        assert_eq!(config.auth.token_ttl_secs, 120);
        assert_eq!(
            config.auth.basic_users.get("user123").map(String::as_str),
            Some("password123")
        );
        assert_eq!(config.database_url(), "sqlite:./data/storefront.db?mode=rwc");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load("/nonexistent/storefront.toml").unwrap();
        assert_eq!(config.auth.mode, AuthModeConfig::Jwt);
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[server]
port = 8080

[auth]
mode = "basic"

[auth.basic_users]
alice = "wonderland"
"#
        )
        .unwrap();

        let config = Config::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert_eq!(config.auth.mode, AuthModeConfig::Basic);
        assert_eq!(config.auth.basic_users.len(), 1);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_rejects_nonpositive_ttl() {
        let mut config = Config::default();
        config.auth.token_ttl_secs = 0;
        assert!(config.validate().is_err());

        config.auth.mode = AuthModeConfig::Basic;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_oversized_ttl() {
        let mut config = Config::default();
        config.auth.token_ttl_secs = MAX_TOKEN_TTL_SECS;
        assert!(config.validate().is_ok());

        for ttl in [MAX_TOKEN_TTL_SECS + 1, 10_000_000_000_000, i64::MAX] {
            config.auth.token_ttl_secs = ttl;
            assert!(config.validate().is_err(), "{}", ttl);
        }
    }

    #[test]
    fn test_auth_mode_from_str() {
        assert_eq!("JWT".parse::<AuthModeConfig>().unwrap(), AuthModeConfig::Jwt);
        assert_eq!("basic".parse::<AuthModeConfig>().unwrap(), AuthModeConfig::Basic);
        assert!("oauth".parse::<AuthModeConfig>().is_err());
    }
}
