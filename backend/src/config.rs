//! Process configuration read from the environment.
//!
//! - `REDIS_URL`: database connection string (default `redis://127.0.0.1:6379`)
//! - `HOST`: bind address (default `0.0.0.0`)
//! - `PORT`: listening port (default `3000`)
//! - `REQUEST_TIMEOUT_SECS`: per-request timeout (default `30`)
//! - `RUST_LOG`: log filter (default [`DEFAULT_LOG_FILTER`])

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
/// Startup and connection events only; per-request traces need `RUST_LOG`.
pub const DEFAULT_LOG_FILTER: &str = "task_api=info,tower_http=warn";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a port number, got '{value}'")]
    InvalidPort { name: &'static str, value: String },

    #[error("{name} must be a positive number of seconds, got '{value}'")]
    InvalidTimeout { name: &'static str, value: String },

    #[error("'{value}' is not a valid bind address")]
    InvalidAddress { value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub redis_url: String,
    pub host: String,
    pub port: u16,
    pub request_timeout: Duration,
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a variable is set to a value that cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, treating blank values as unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a variable is set to a value that cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let port = match read("PORT") {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidPort {
                name: "PORT",
                value,
            })?,
            None => DEFAULT_PORT,
        };

        let timeout_secs = match read("REQUEST_TIMEOUT_SECS") {
            Some(value) => match value.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::InvalidTimeout {
                        name: "REQUEST_TIMEOUT_SECS",
                        value,
                    })
                }
            },
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        Ok(Self {
            redis_url: read("REDIS_URL").unwrap_or_else(|| DEFAULT_REDIS_URL.to_string()),
            host: read("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// # Errors
    ///
    /// Returns `ConfigError::InvalidAddress` when `HOST` is not an IP address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidAddress {
                value: self.host.clone(),
            })
    }
}
