//! Environment-based configuration
//!
//! Values are read after `dotenvy::dotenv()` so a local `.env` file works too.

use std::env;

use thiserror::Error;

use crate::services::apg::DEFAULT_BASE_URL;

/// Default pause between scheduled runs of the service binary
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 3600;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub apg_base_url: String,
    pub sync_interval_secs: u64,
    /// Lookback used by scheduled runs while the table is still empty
    pub initial_lookback_days: Option<u32>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let apg_base_url = lookup("APG_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let sync_interval_secs = parse_var(&lookup, "IMBALANCE_SYNC_INTERVAL_SECS")?
            .unwrap_or(DEFAULT_SYNC_INTERVAL_SECS);
        let initial_lookback_days = parse_var(&lookup, "IMBALANCE_INITIAL_LOOKBACK_DAYS")?;

        if sync_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "IMBALANCE_SYNC_INTERVAL_SECS",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            database_url,
            apg_base_url,
            sync_interval_secs,
            initial_lookback_days,
        })
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
