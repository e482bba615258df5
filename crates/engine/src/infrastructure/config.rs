//! Application configuration

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::infrastructure::resilient::RetryConfig;

/// Where spell data comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSourceKind {
    /// The spell-data REST service
    Http,
    /// A seed file loaded into memory
    Memory,
}

impl FromStr for DataSourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "http" | "api" => Ok(Self::Http),
            "memory" | "in-memory" | "file" => Ok(Self::Memory),
            other => bail!("Unknown data source '{}': expected 'http' or 'memory'", other),
        }
    }
}

/// Application configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Spell data backend
    pub data_source: DataSourceKind,
    /// Spell-data service base URL
    pub api_url: String,
    /// Bearer token for the spell-data service
    pub api_token: Option<String>,
    /// Seed file for the in-memory data source
    pub seed_path: PathBuf,
    /// Per-request HTTP timeout
    pub http_timeout: Duration,
    /// Retry behavior for transient data failures
    pub retry: RetryConfig,
    /// Reject casts from exhausted slot levels
    pub enforce_slot_cap: bool,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = RetryConfig::default();
        Ok(Self {
            data_source: env::var("SPELLBOOK_DATA_SOURCE")
                .unwrap_or_else(|_| "http".to_string())
                .parse()?,
            api_url: env::var("SPELLBOOK_API_URL")
                .unwrap_or_else(|_| "http://localhost:8880".to_string()),
            api_token: env::var("SPELLBOOK_API_TOKEN")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            seed_path: env::var("SPELLBOOK_SEED_PATH")
                .unwrap_or_else(|_| "data/spells.json".to_string())
                .into(),
            http_timeout: Duration::from_secs(
                env::var("SPELLBOOK_HTTP_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .context("SPELLBOOK_HTTP_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            retry: RetryConfig {
                max_retries: env::var("SPELLBOOK_MAX_RETRIES")
                    .unwrap_or_else(|_| "3".to_string())
                    .parse()
                    .context("SPELLBOOK_MAX_RETRIES must be a non-negative integer")?,
                base_delay_ms: env::var("SPELLBOOK_RETRY_BASE_DELAY_MS")
                    .unwrap_or_else(|_| "250".to_string())
                    .parse()
                    .context("SPELLBOOK_RETRY_BASE_DELAY_MS must be a number of milliseconds")?,
                ..defaults
            },
            enforce_slot_cap: parse_flag(
                "SPELLBOOK_ENFORCE_SLOT_CAP",
                &env::var("SPELLBOOK_ENFORCE_SLOT_CAP").unwrap_or_else(|_| "true".to_string()),
            )?,
        })
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("{} must be true or false, got '{}'", name, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_source_parses_known_kinds() {
        assert_eq!("HTTP".parse::<DataSourceKind>().unwrap(), DataSourceKind::Http);
        assert_eq!("memory".parse::<DataSourceKind>().unwrap(), DataSourceKind::Memory);
        assert!("postgres".parse::<DataSourceKind>().is_err());
    }

    #[test]
    fn flags_accept_common_spellings() {
        assert!(parse_flag("X", "yes").unwrap());
        assert!(!parse_flag("X", "0").unwrap());
        assert!(parse_flag("X", "maybe").is_err());
    }
}
