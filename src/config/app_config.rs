use std::{env, net::SocketAddr, path::Path};

use tracing::warn;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be a valid {expected}, got {value:?}")]
    InvalidValue {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Runtime settings, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
    pub cors_allow_origin: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(AppConfig {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://data/userdesk.db".to_string()),
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", "connection count", 5)?,
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT", "port number", 8080)?,
            log_format: match env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => LogFormat::Text,
            },
            cors_allow_origin: env::var("CORS_ALLOW_ORIGIN").unwrap_or_else(|_| "*".to_string()),
        })
    }

    /// Logs settings that are legal but risky outside development.
    pub fn warn_on_risky_settings(&self) {
        if self.is_production() && self.cors_allow_origin == "*" {
            warn!("CORS_ALLOW_ORIGIN is '*' in production; any origin may call the API");
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip = self
            .host
            .parse::<std::net::IpAddr>()
            .map_err(|_| ConfigError::InvalidValue {
                key: "HOST",
                expected: "IP address",
                value: self.host.clone(),
            })?;
        Ok(SocketAddr::from((ip, self.port)))
    }

    /// Filesystem directory holding the database file, if the URL names one.
    pub fn database_dir(&self) -> Option<&Path> {
        let path = self
            .database_url
            .strip_prefix("sqlite://")
            .or_else(|| self.database_url.strip_prefix("sqlite:"))?;
        let path = path.split('?').next().unwrap_or(path);
        if path.is_empty() || path.starts_with(":memory:") {
            return None;
        }
        Path::new(path).parent().filter(|p| !p.as_os_str().is_empty())
    }
}

fn parse_var<T: std::str::FromStr>(
    key: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key,
            expected,
            value,
        }),
        Err(_) => Ok(default),
    }
}
