use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_GENERATION_MODELS: &str = "gemini-1.5-pro-latest,gemini-2.5-pro";
const DEFAULT_EMBEDDING_MODELS: &str = "text-embedding-004,embedding-001";

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub gemini_api_key: String,
    pub gemini_base_url: String,
    /// Tried in order until one succeeds.
    pub generation_models: Vec<String>,
    pub embedding_models: Vec<String>,
    pub shortlist_threshold: f32,
    pub embedding_concurrency: usize,
    pub embedding_timeout: Duration,
    pub seed_consultants: bool,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let shortlist_threshold: f32 = optional_env("SHORTLIST_THRESHOLD", 0.6)?;
        if !(-1.0..=1.0).contains(&shortlist_threshold) {
            bail!("SHORTLIST_THRESHOLD must be within [-1, 1], got {shortlist_threshold}");
        }

        let embedding_concurrency: usize = optional_env("EMBEDDING_CONCURRENCY", 8)?;
        let timeout_secs: u64 = optional_env("EMBEDDING_TIMEOUT_SECS", 20)?;

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            gemini_base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string()),
            generation_models: model_list("GENERATION_MODELS", DEFAULT_GENERATION_MODELS)?,
            embedding_models: model_list("EMBEDDING_MODELS", DEFAULT_EMBEDDING_MODELS)?,
            shortlist_threshold,
            embedding_concurrency: embedding_concurrency.max(1),
            embedding_timeout: Duration::from_secs(timeout_secs.max(1)),
            seed_consultants: optional_env("SEED_CONSULTANTS", true)?,
            port: optional_env("PORT", 5000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

fn model_list(key: &str, default: &str) -> Result<Vec<String>> {
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    let models = parse_model_list(&raw);
    if models.is_empty() {
        bail!("'{key}' must name at least one model");
    }
    Ok(models)
}

/// Splits a comma-separated model list, dropping blanks.
pub fn parse_model_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(String::from)
        .collect()
}
