use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub openai_api_key: String,
    pub openai_base_url: Option<String>,
    pub generation_model: String,
    /// Topics claimed per batch drain
    pub batch_size: i64,
    /// Caller-side timeout per generation call; `None` waits forever
    pub generation_timeout: Option<Duration>,
    pub stuck_run_timeout_minutes: i64,
    pub daily_run_cron: String,
    pub reconcile_cron: String,
    pub scheduler_enabled: bool,
}

pub const DEFAULT_BATCH_SIZE: i64 = 10;
pub const DEFAULT_STUCK_RUN_TIMEOUT_MINUTES: i64 = 10;
pub const DEFAULT_GENERATION_MODEL: &str = "gpt-4o-mini";

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let generation_timeout_secs: u64 = parse_var("GENERATION_TIMEOUT_SECS", 180)?;

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: parse_var("PORT", 8080)?,
            openai_api_key: env::var("OPENAI_API_KEY").context("OPENAI_API_KEY must be set")?,
            openai_base_url: env::var("OPENAI_BASE_URL").ok(),
            generation_model: env::var("GENERATION_MODEL")
                .unwrap_or_else(|_| DEFAULT_GENERATION_MODEL.to_string()),
            batch_size: check_batch_size(parse_var("BATCH_SIZE", DEFAULT_BATCH_SIZE)?)?,
            generation_timeout: timeout_from_secs(generation_timeout_secs),
            stuck_run_timeout_minutes: parse_var(
                "STUCK_RUN_TIMEOUT_MINUTES",
                DEFAULT_STUCK_RUN_TIMEOUT_MINUTES,
            )?,
            daily_run_cron: env::var("DAILY_RUN_CRON").unwrap_or_else(|_| "0 0 6 * * *".to_string()),
            reconcile_cron: env::var("RECONCILE_CRON")
                .unwrap_or_else(|_| "0 */5 * * * *".to_string()),
            scheduler_enabled: parse_var("SCHEDULER_ENABLED", true)?,
        })
    }
}

/// Read an optional variable, falling back to `default` when unset.
fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => parse_value(name, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(name: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse()
        .with_context(|| format!("{} must be a valid value (got {:?})", name, raw))
}

fn check_batch_size(size: i64) -> Result<i64> {
    if size < 1 {
        anyhow::bail!("BATCH_SIZE must be at least 1 (got {})", size);
    }
    Ok(size)
}

fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}
