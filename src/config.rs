//! Registry configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup and validated before the registry
//! is constructed. Binaries load a `.env` file first via `dotenvy`.
//!
//! ## Variables
//!
//! - `MAX_TTL_MINUTES` - Upper bound for entry TTLs (default: 43200, range: 1..=525600)
//! - `CODE_GENERATION_ATTEMPTS` - Generated codes tried per create (default: 10, range: 1..=100)
//! - `RECENT_ACTIVITY_LIMIT` - Size of the activity feed (default: 10, range: 1..=1000)
//! - `SNAPSHOT_PATH` - JSON file the admin CLI reads and writes (default: `linkshrinker.json`)
//! - `BASE_URL` - Prefix used when printing short URLs (default: `http://localhost:3000`)
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

use crate::application::services::link_service::DEFAULT_GENERATION_ATTEMPTS;
use crate::domain::expiration::DEFAULT_MAX_TTL_MINUTES;

/// One year, the largest accepted `MAX_TTL_MINUTES`.
const MAX_TTL_CEILING: i64 = 525_600;

/// Registry configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub max_ttl_minutes: i64,
    pub code_generation_attempts: usize,
    pub recent_activity_limit: usize,
    pub snapshot_path: String,
    pub base_url: String,
    pub log_level: String,
    pub log_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_ttl_minutes: DEFAULT_MAX_TTL_MINUTES,
            code_generation_attempts: DEFAULT_GENERATION_ATTEMPTS,
            recent_activity_limit: 10,
            snapshot_path: "linkshrinker.json".to_string(),
            base_url: "http://localhost:3000".to_string(),
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// Unset variables fall back to [`Config::default`].
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable is set but does not parse.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            max_ttl_minutes: parse_var("MAX_TTL_MINUTES", defaults.max_ttl_minutes)?,
            code_generation_attempts: parse_var(
                "CODE_GENERATION_ATTEMPTS",
                defaults.code_generation_attempts,
            )?,
            recent_activity_limit: parse_var(
                "RECENT_ACTIVITY_LIMIT",
                defaults.recent_activity_limit,
            )?,
            snapshot_path: env::var("SNAPSHOT_PATH").unwrap_or(defaults.snapshot_path),
            base_url: env::var("BASE_URL").unwrap_or(defaults.base_url),
            log_level: env::var("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: env::var("LOG_FORMAT").unwrap_or(defaults.log_format),
        })
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - a numeric limit is outside its range
    /// - `snapshot_path` is empty
    /// - `base_url` is not HTTP(S)
    /// - `log_format` is not `text` or `json`
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_TTL_CEILING).contains(&self.max_ttl_minutes) {
            anyhow::bail!(
                "MAX_TTL_MINUTES must be between 1 and {}, got {}",
                MAX_TTL_CEILING,
                self.max_ttl_minutes
            );
        }

        if !(1..=100).contains(&self.code_generation_attempts) {
            anyhow::bail!(
                "CODE_GENERATION_ATTEMPTS must be between 1 and 100, got {}",
                self.code_generation_attempts
            );
        }

        if !(1..=1000).contains(&self.recent_activity_limit) {
            anyhow::bail!(
                "RECENT_ACTIVITY_LIMIT must be between 1 and 1000, got {}",
                self.recent_activity_limit
            );
        }

        if self.snapshot_path.trim().is_empty() {
            anyhow::bail!("SNAPSHOT_PATH must not be empty");
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            anyhow::bail!(
                "BASE_URL must start with 'http://' or 'https://', got '{}'",
                self.base_url
            );
        }

        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        Ok(())
    }

    /// Logs the effective configuration.
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Max TTL: {} minutes", self.max_ttl_minutes);
        tracing::info!(
            "  Code generation attempts: {}",
            self.code_generation_attempts
        );
        tracing::info!("  Recent activity limit: {}", self.recent_activity_limit);
        tracing::info!("  Snapshot: {}", self.snapshot_path);
        tracing::info!("  Base URL: {}", self.base_url);
        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);
    }
}

fn parse_var<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

/// Loads and validates configuration from environment variables.
///
/// # Errors
///
/// Returns an error if a variable does not parse or validation fails.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in the binary).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}
