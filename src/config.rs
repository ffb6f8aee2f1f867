use std::net::SocketAddr;

use anyhow::Context;

use crate::gemini::{DEFAULT_GEMINI_URL, DEFAULT_MODEL};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://omnilearn.db?mode=rwc";
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub gemini_url: String,
    pub database_url: String,
    pub bind: SocketAddr,
}

impl Config {
    /// Reads `.env` if present, then the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_raw = get("OMNILEARN_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw
            .parse::<SocketAddr>()
            .with_context(|| format!("OMNILEARN_BIND is not a socket address: {}", bind_raw))?;

        Ok(Self {
            api_key: get("GEMINI_API_KEY").or_else(|| get("API_KEY")),
            model: get("OMNILEARN_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_url: get("OMNILEARN_GEMINI_URL").unwrap_or_else(|| DEFAULT_GEMINI_URL.to_string()),
            database_url: get("OMNILEARN_DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            bind,
        })
    }
}
