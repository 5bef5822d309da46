//! Runtime configuration from environment variables.
//!
//! A `.env` file in the working directory is loaded first when present.

use std::env;
use std::time::Duration;

pub const DEFAULT_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_DB_PATH: &str = ".notevault_db";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MOCK_DELAY_MS: u64 = 20;

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: String,
    pub db_path: String,
    /// Google AI key; without one the assistant answers from canned text.
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    pub mock_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            db_path: DEFAULT_DB_PATH.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            mock_delay: Duration::from_millis(DEFAULT_MOCK_DELAY_MS),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            addr: get("NOTEVAULT_ADDR").unwrap_or(defaults.addr),
            db_path: get("NOTEVAULT_DB").unwrap_or(defaults.db_path),
            api_key: get("GOOGLE_AI_API_KEY"),
            model: get("NOTEVAULT_MODEL").unwrap_or(defaults.model),
            api_base: get("NOTEVAULT_API_BASE").unwrap_or(defaults.api_base),
            mock_delay: get("NOTEVAULT_MOCK_DELAY_MS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.mock_delay),
        }
    }
}
