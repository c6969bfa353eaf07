//! # Configuration Module
//!
//! Runtime settings read once at startup from the environment (after
//! `.env` has been loaded by `main`).

use std::env;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

pub const DEFAULT_STRAPI_URL: &str = "http://localhost:1337";
pub const DEFAULT_STRAPI_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_REDIS_PORT: u16 = 6379;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Strapi connection settings.
#[derive(Debug, Clone)]
pub struct StrapiConfig {
    pub base_url: String,
    pub token: SecretString,
    /// Per-request timeout
    pub timeout: Duration,
}

/// Where conversation states are persisted.
#[derive(Debug, Clone)]
pub enum StateStoreConfig {
    InMemory,
    Redis(SecretString),
    Postgres(SecretString),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: SecretString,
    pub strapi: StrapiConfig,
    pub state_store: StateStoreConfig,
}

impl Config {
    /// Read the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read the configuration through `lookup`; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let required = |name: &'static str| var(name).ok_or(ConfigError::Missing(name));

        // `TG_BOT_TOKEN` is the older name, still found in existing `.env` files.
        let bot_token = var("TELEGRAM_BOT_TOKEN")
            .or_else(|| var("TG_BOT_TOKEN"))
            .map(SecretString::from)
            .ok_or(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))?;

        let timeout_secs = match var("STRAPI_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                name: "STRAPI_TIMEOUT_SECS",
                reason: e.to_string(),
            })?,
            None => DEFAULT_STRAPI_TIMEOUT_SECS,
        };

        let strapi = StrapiConfig {
            base_url: var("STRAPI_URL").unwrap_or_else(|| DEFAULT_STRAPI_URL.to_string()),
            token: SecretString::from(required("STRAPI_TOKEN")?),
            timeout: Duration::from_secs(timeout_secs),
        };

        Ok(Self {
            bot_token,
            strapi,
            state_store: state_store_from(&var)?,
        })
    }
}

/// `STATE_STORE_URL` wins; otherwise the host/port/password triple selects
/// Redis; with neither, states live in memory.
fn state_store_from(
    var: &impl Fn(&str) -> Option<String>,
) -> Result<StateStoreConfig, ConfigError> {
    if let Some(url) = var("STATE_STORE_URL") {
        let scheme = url.split("://").next().unwrap_or_default();
        return match scheme {
            "redis" | "rediss" => Ok(StateStoreConfig::Redis(SecretString::from(url))),
            "postgres" | "postgresql" => Ok(StateStoreConfig::Postgres(SecretString::from(url))),
            _ => Err(ConfigError::Invalid {
                name: "STATE_STORE_URL",
                reason: format!("unsupported scheme '{scheme}'"),
            }),
        };
    }

    let Some(host) = var("REDIS_DB_HOST") else {
        return Ok(StateStoreConfig::InMemory);
    };

    let port = match var("REDIS_DB_PORT") {
        Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
            name: "REDIS_DB_PORT",
            reason: e.to_string(),
        })?,
        None => DEFAULT_REDIS_PORT,
    };

    let url = match var("REDIS_DB_PASSWORD") {
        Some(password) => format!("redis://:{password}@{host}:{port}/"),
        None => format!("redis://{host}:{port}/"),
    };
    Ok(StateStoreConfig::Redis(SecretString::from(url)))
}
