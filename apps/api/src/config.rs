use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Hard per-call timeout for every LLM call, in seconds.
    pub llm_timeout_secs: u64,
    /// Concurrency ceiling for batch match scoring.
    pub match_concurrency: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any name→value lookup. Process environment in
    /// production; a plain table in tests, which keeps them free of global
    /// env mutation.
    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let anthropic_api_key = get("ANTHROPIC_API_KEY")
            .context("Required environment variable 'ANTHROPIC_API_KEY' is not set")?;

        Ok(Config {
            anthropic_api_key,
            port: get("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            llm_timeout_secs: get("LLM_TIMEOUT_SECS")
                .unwrap_or_else(|| "30".to_string())
                .parse::<u64>()
                .context("LLM_TIMEOUT_SECS must be a positive integer")?,
            match_concurrency: get("MATCH_CONCURRENCY")
                .unwrap_or_else(|| "4".to_string())
                .parse::<usize>()
                .context("MATCH_CONCURRENCY must be a positive integer")?,
        })
    }
}
