//! Client configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honoured for local development.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the CourseHub REST API (no trailing slash)
    pub api_base_url: String,
    /// File backing durable session storage
    pub storage_path: PathBuf,
    /// Per-request HTTP timeout
    pub http_timeout: Duration,
    /// Google OAuth client ID; Google sign-in is disabled when unset
    pub google_client_id: Option<String>,
}

impl Config {
    const DEFAULT_API_URL: &str = "http://localhost:8080/api";
    const DEFAULT_STORAGE_PATH: &str = ".coursehub/session.json";
    const DEFAULT_TIMEOUT_SECS: u64 = 10;

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let http_timeout_secs = match env::var("COURSEHUB_HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid("COURSEHUB_HTTP_TIMEOUT_SECS", raw))?,
            Err(_) => Self::DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_base_url: env::var("COURSEHUB_API_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or_else(|_| Self::DEFAULT_API_URL.to_string()),
            storage_path: env::var("COURSEHUB_STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(Self::DEFAULT_STORAGE_PATH)),
            http_timeout: Duration::from_secs(http_timeout_secs),
            google_client_id: env::var("GOOGLE_CLIENT_ID")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
        })
    }

    /// Offline defaults for tests.
    pub fn test_default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:9/api".to_string(),
            storage_path: PathBuf::from("target/test-session.json"),
            http_timeout: Duration::from_secs(2),
            google_client_id: Some("test-client-id.apps.googleusercontent.com".to_string()),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),

    #[error("Google sign-in is not configured (set GOOGLE_CLIENT_ID)")]
    GoogleDisabled,
}
