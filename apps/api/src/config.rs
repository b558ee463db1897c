use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::profile::{is_supported_language, SUPPORTED_LANGUAGES};
use crate::usage::{DEFAULT_MAX_DAILY_TOKENS, DEFAULT_MAX_MESSAGES_PER_MINUTE};

/// Where the device key-value data lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    File(PathBuf),
    Redis { url: String, namespace: String },
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub store: StoreBackend,
    pub max_daily_tokens: u64,
    pub max_messages_per_minute: usize,
    pub default_language: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            store: store_backend_from_env()?,
            max_daily_tokens: parse_env("MAX_DAILY_TOKENS", DEFAULT_MAX_DAILY_TOKENS)?,
            max_messages_per_minute: parse_env(
                "MAX_MESSAGES_PER_MINUTE",
                DEFAULT_MAX_MESSAGES_PER_MINUTE,
            )?,
            default_language: default_language(
                &std::env::var("DEFAULT_LANGUAGE").unwrap_or_else(|_| "en".to_string()),
            )?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn store_backend_from_env() -> Result<StoreBackend> {
    let backend = std::env::var("STORE_BACKEND").unwrap_or_else(|_| "file".to_string());
    match backend.as_str() {
        "memory" => Ok(StoreBackend::Memory),
        "file" => Ok(StoreBackend::File(
            std::env::var("STORE_PATH")
                .unwrap_or_else(|_| "./data/store.json".to_string())
                .into(),
        )),
        "redis" => Ok(StoreBackend::Redis {
            url: require_env("REDIS_URL")?,
            namespace: std::env::var("STORE_NAMESPACE").unwrap_or_else(|_| "sona".to_string()),
        }),
        other => bail!("STORE_BACKEND must be one of memory, file, redis (got '{other}')"),
    }
}

fn default_language(raw: &str) -> Result<String> {
    let code = raw.trim();
    if !is_supported_language(code) {
        bail!(
            "DEFAULT_LANGUAGE must be one of {} (got '{code}')",
            SUPPORTED_LANGUAGES.join(", ")
        );
    }
    Ok(code.to_string())
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number")),
        Err(_) => Ok(default),
    }
}
