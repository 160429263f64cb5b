use std::{env, net::SocketAddr, str::FromStr, time::Duration};

use thiserror::Error;
use tracing::Level;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
    pub busy_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: SocketAddr,
    pub database: DatabaseConfig,
    pub log_level: Level,
    pub seed_on_startup: bool,
}

impl ServerConfig {
    pub const DEFAULT_DATABASE_URL: &'static str = "recipes.db";
    pub const DEFAULT_BIND_ADDRESS: &'static str = "127.0.0.1:8000";
    pub const DEFAULT_POOL_SIZE: u32 = 4;
    pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

    /// Reads the configuration from the process environment, after loading a
    /// `.env` file if one is present.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env is fine, the variables may come from the real environment
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("DATABASE_URL").unwrap_or_else(|| Self::DEFAULT_DATABASE_URL.to_owned());

        let pool_size: u32 = parse_or(&lookup, "DATABASE_POOL_SIZE", Self::DEFAULT_POOL_SIZE)?;
        if pool_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "DATABASE_POOL_SIZE",
                value: pool_size.to_string(),
                reason: "pool needs at least one connection".to_owned(),
            });
        }

        let busy_timeout_ms: u64 = parse_or(
            &lookup,
            "DATABASE_BUSY_TIMEOUT_MS",
            Self::DEFAULT_BUSY_TIMEOUT_MS,
        )?;

        let bind_address = parse_or(
            &lookup,
            "BIND_ADDRESS",
            SocketAddr::from(([127, 0, 0, 1], 8000)),
        )?;
        let log_level = parse_or(&lookup, "LOG_LEVEL", Level::INFO)?;
        let seed_on_startup = parse_or(&lookup, "SEED_ON_STARTUP", true)?;

        Ok(Self {
            bind_address,
            database: DatabaseConfig {
                url,
                pool_size,
                busy_timeout: Duration::from_millis(busy_timeout_ms),
            },
            log_level,
            seed_on_startup,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|err: T::Err| ConfigError::InvalidValue {
                key,
                value,
                reason: err.to_string(),
            }),
    }
}
