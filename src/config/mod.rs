//! Configuration module for the admin client.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::{ApiError, Result};

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the admin REST API
    pub base_url: String,
    /// Value sent in the Accept-Language header
    pub accept_language: String,
    /// File the bearer token is persisted to (in-memory when unset)
    pub token_path: Option<PathBuf>,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Default page size for offset-paginated lists
    pub page_size: u32,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000/api".to_string(),
            accept_language: "lo".to_string(),
            token_path: None,
            request_timeout: Duration::from_secs(30),
            page_size: 10,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        let base_url = env::var("ADMIN_API_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.base_url);

        let accept_language =
            env::var("ADMIN_ACCEPT_LANGUAGE").unwrap_or(defaults.accept_language);

        let token_path = env::var("ADMIN_TOKEN_PATH").ok().map(PathBuf::from);

        let request_timeout = match env::var("ADMIN_REQUEST_TIMEOUT_SECS") {
            Ok(raw) => Duration::from_secs(parse_number("ADMIN_REQUEST_TIMEOUT_SECS", &raw)?),
            Err(_) => defaults.request_timeout,
        };

        let page_size = match env::var("ADMIN_PAGE_SIZE") {
            Ok(raw) => parse_page_size(&raw)?,
            Err(_) => defaults.page_size,
        };

        let log_level = env::var("ADMIN_LOG_LEVEL").unwrap_or(defaults.log_level);

        Ok(Self {
            base_url,
            accept_language,
            token_path,
            request_timeout,
            page_size,
            log_level,
        })
    }
}

fn parse_number(key: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::Config(format!("{} must be a positive integer, got {:?}", key, raw)))
}

fn parse_page_size(raw: &str) -> Result<u32> {
    let size = parse_number("ADMIN_PAGE_SIZE", raw)?;
    match u32::try_from(size) {
        Ok(size) if size > 0 => Ok(size),
        _ => Err(ApiError::Config(format!(
            "ADMIN_PAGE_SIZE must be between 1 and {}, got {}",
            u32::MAX,
            size
        ))),
    }
}
