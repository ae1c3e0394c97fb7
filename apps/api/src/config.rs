use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
///
/// The analysis API key is optional: without it the service still starts,
/// and every analysis fails fast with a configuration error.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: Option<String>,
    pub anthropic_api_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
    /// Cosmetic pause before extraction so a loading indicator is visible.
    pub loading_grace: Duration,
    pub max_upload_bytes: usize,
    /// Sessions untouched for this long are dropped from the registry.
    pub session_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            anthropic_api_key: None,
            anthropic_api_url: None,
            port: 8080,
            rust_log: "info".to_string(),
            loading_grace: Duration::from_millis(300),
            max_upload_bytes: 10 * 1024 * 1024,
            session_ttl: Duration::from_secs(30 * 60),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        Ok(Config {
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            anthropic_api_url: optional_env("ANTHROPIC_API_URL"),
            port: parse_env("PORT", defaults.port).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            loading_grace: parse_env("LOADING_GRACE_MS", 300u64)
                .map(Duration::from_millis)
                .context("LOADING_GRACE_MS must be a whole number of milliseconds")?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)
                .context("MAX_UPLOAD_BYTES must be a whole number of bytes")?,
            session_ttl: parse_env("SESSION_TTL_SECS", defaults.session_ttl.as_secs())
                .map(Duration::from_secs)
                .context("SESSION_TTL_SECS must be a whole number of seconds")?,
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Invalid value '{raw}' for environment variable '{key}'")),
        None => Ok(default),
    }
}
