use std::env;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub generation_timeout_seconds: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: var_or("HOST", "127.0.0.1"),
            port: var_or("PORT", "8080")
                .parse()
                .context("Invalid PORT")?,
            database_url: var_or(
                "DATABASE_URL",
                captain_persistence::connection::DEFAULT_DATABASE_URL,
            ),
            gemini_api_key: var_or("GEMINI_API_KEY", ""),
            gemini_model: var_or("GEMINI_MODEL", "gemini-2.5-flash"),
            gemini_base_url: var_or(
                "GEMINI_BASE_URL",
                "https://generativelanguage.googleapis.com",
            ),
            generation_timeout_seconds: var_or("GENERATION_TIMEOUT_SECONDS", "120")
                .parse()
                .context("Invalid GENERATION_TIMEOUT_SECONDS")?,
        })
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}
