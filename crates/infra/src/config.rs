//! Configuration loading and representation.

use std::net::{IpAddr, SocketAddr};

use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Process configuration, read from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
    /// When unset the service keeps products in memory.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::from([0, 0, 0, 0]),
            port: DEFAULT_PORT,
            database_url: None,
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
        }
    }
}

impl AppConfig {
    /// Read `BIND_ADDR`, `PORT`, `DATABASE_URL` and `DB_MAX_CONNECTIONS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::Invalid {
                var: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                var: "PORT",
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let database_url = lookup("DATABASE_URL")
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(0) => {
                    return Err(ConfigError::Invalid {
                        var: "DB_MAX_CONNECTIONS",
                        reason: "must be at least 1".to_string(),
                    });
                }
                Ok(n) => n,
                Err(e) => {
                    return Err(ConfigError::Invalid {
                        var: "DB_MAX_CONNECTIONS",
                        reason: e.to_string(),
                    });
                }
            },
            None => DEFAULT_DB_MAX_CONNECTIONS,
        };

        Ok(Self {
            bind_addr,
            port,
            database_url,
            db_max_connections,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}
