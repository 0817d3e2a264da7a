//! Environment configuration
//!
//! The backend base URL is a single injected value. Everything else has a
//! sensible default so the CLI runs with nothing but `FLEET_API_URL` set.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use dotenvy::dotenv;
use tracing::Level;

use crate::utils::errors::{AppError, AppResult};

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client configuration
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub api_base_url: String,
    pub session_file: PathBuf,
    pub request_timeout: Duration,
    pub log_level: Level,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            api_base_url: DEFAULT_API_URL.to_string(),
            session_file: default_session_file(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            log_level: Level::INFO,
        }
    }
}

impl EnvironmentConfig {
    /// Load `.env` if present, then read the `FLEET_*` variables
    pub fn from_env() -> AppResult<Self> {
        dotenv().ok();

        let defaults = Self::default();

        let api_base_url = env::var("FLEET_API_URL")
            .map(|url| normalize_base_url(&url))
            .unwrap_or(defaults.api_base_url);

        let session_file = env::var("FLEET_SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.session_file);

        let request_timeout = match env::var("FLEET_REQUEST_TIMEOUT_SECS") {
            Ok(raw) => Duration::from_secs(raw.trim().parse().map_err(|_| {
                AppError::Config(format!(
                    "FLEET_REQUEST_TIMEOUT_SECS must be a number of seconds, got '{}'",
                    raw
                ))
            })?),
            Err(_) => defaults.request_timeout,
        };

        let log_level = match env::var("FLEET_LOG_LEVEL") {
            Ok(raw) => raw.trim().parse::<Level>().map_err(|_| {
                AppError::Config(format!("FLEET_LOG_LEVEL is not a valid level: '{}'", raw))
            })?,
            Err(_) => defaults.log_level,
        };

        Ok(Self {
            environment: env::var("FLEET_ENVIRONMENT").unwrap_or(defaults.environment),
            api_base_url,
            session_file,
            request_timeout,
            log_level,
        })
    }

    /// Config pointed at an explicit backend, used by tests and embedding code
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            api_base_url: normalize_base_url(base_url),
            ..Self::default()
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Absolute URL of a backend path such as `/load/`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn default_session_file() -> PathBuf {
    match env::var("HOME") {
        Ok(home) => PathBuf::from(home).join(".fleet-admin").join("session.json"),
        Err(_) => PathBuf::from(".fleet-admin-session.json"),
    }
}
