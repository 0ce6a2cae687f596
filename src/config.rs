use std::{env, fmt::Display, str::FromStr};

use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is required")]
    Missing(&'static str),

    #[error("environment variable {key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Credentials for the hosted database's REST endpoint.
#[derive(Debug, Clone)]
pub struct RecordsConfig {
    pub base_url: String,
    pub anon_key: String,
}

/// Credentials for the GitHub repository used as screenshot storage.
#[derive(Debug, Clone)]
pub struct BlobConfig {
    pub api_url: String,
    pub token: String,
    pub repo_owner: String,
    pub repo_name: String,
    pub branch: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Session values untouched for this long are deleted.
    pub session_idle_hours: i64,
    pub records: RecordsConfig,
    pub blob: BlobConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: load_or("DATABASE_URL", "sqlite://diwali.db?mode=rwc"),
            host: load_or("HOST", "127.0.0.1"),
            port: try_load("PORT", "3000")?,
            session_idle_hours: try_load("SESSION_IDLE_HOURS", "48")?,
            records: RecordsConfig {
                base_url: require("SUPABASE_URL")?,
                anon_key: require("SUPABASE_ANON_KEY")?,
            },
            blob: BlobConfig::from_env()?,
        })
    }
}

impl BlobConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: load_or("GITHUB_API_URL", "https://api.github.com"),
            token: require("GITHUB_TOKEN")?,
            repo_owner: require("GITHUB_REPO_OWNER")?,
            repo_name: require("GITHUB_REPO_NAME")?,
            branch: load_or("GITHUB_BRANCH", "main"),
        })
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn require(key: &'static str) -> Result<String, ConfigError> {
    var(key).ok_or_else(|| {
        warn!("Environment variable {key} not found");
        ConfigError::Missing(key)
    })
}

fn load_or(key: &str, default: &str) -> String {
    var(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    load_or(key, default)
        .parse()
        .map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        })
}
