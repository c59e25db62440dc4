//! Configuration module for the Hookboard client.
//!
//! This module handles parsing configuration from environment variables.
//!
//! # Environment Variables
//!
//! | Variable | Required | Default | Description |
//! |----------|----------|---------|-------------|
//! | `HOOKBOARD_API_URL` | No | `http://localhost:3000` | Backend base URL |
//! | `HOOKBOARD_SESSION_DIR` | No | `~/.hookboard` | Directory holding the session token file |
//! | `HOOKBOARD_REQUEST_TIMEOUT_SECS` | No | 30 | Per-request timeout in seconds |
//! | `HOOKBOARD_INTERCEPT_AUTH_ENDPOINTS` | No | `true` | Apply 401 interception to login/register too |
//!
//! # Example
//!
//! ```no_run
//! use hookboard_client::config::Config;
//!
//! let config = Config::from_env().expect("Failed to load configuration");
//! println!("API URL: {}", config.api_url);
//! ```

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use directories::BaseDirs;
use thiserror::Error;
use url::Url;

use crate::api::InterceptPolicy;

/// Backend URL used when `HOOKBOARD_API_URL` is unset.
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Default session directory name relative to home.
const DEFAULT_SESSION_DIR: &str = ".hookboard";

/// Default per-request timeout.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Errors that can occur during configuration parsing.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Environment variable has an invalid value.
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to determine home directory.
    #[error("failed to determine home directory")]
    NoHomeDirectory,
}

/// Configuration for the Hookboard client.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL without a trailing slash (e.g., `https://hooks.example.com`).
    pub api_url: String,

    /// Directory containing the persisted session token.
    pub session_dir: PathBuf,

    /// Timeout applied to every request.
    pub request_timeout: Duration,

    /// Which responses trigger session invalidation on 401.
    pub intercept_policy: InterceptPolicy,
}

impl Config {
    /// Creates a configuration for the given base URL and session directory,
    /// using defaults for everything else.
    #[must_use]
    pub fn new(api_url: impl Into<String>, session_dir: PathBuf) -> Self {
        Self {
            api_url: normalize_url(&api_url.into()),
            session_dir,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            intercept_policy: InterceptPolicy::default(),
        }
    }

    /// Creates a new `Config` by parsing environment variables.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if:
    /// - `HOOKBOARD_API_URL` is set but empty or not an http(s) URL
    /// - `HOOKBOARD_REQUEST_TIMEOUT_SECS` is not a positive integer
    /// - `HOOKBOARD_INTERCEPT_AUTH_ENDPOINTS` is not a boolean
    /// - The home directory cannot be determined and `HOOKBOARD_SESSION_DIR` is unset
    pub fn from_env() -> Result<Self, ConfigError> {
        // Optional: HOOKBOARD_API_URL (default: http://localhost:3000)
        let api_url = match env::var("HOOKBOARD_API_URL") {
            Ok(val) => {
                validate_api_url(val.trim()).map_err(|message| ConfigError::InvalidValue {
                    key: "HOOKBOARD_API_URL".to_string(),
                    message,
                })?;
                normalize_url(&val)
            }
            Err(_) => DEFAULT_API_URL.to_string(),
        };

        // Optional: HOOKBOARD_SESSION_DIR (default: ~/.hookboard)
        let session_dir = match env::var("HOOKBOARD_SESSION_DIR") {
            Ok(val) => PathBuf::from(val),
            Err(_) => {
                let base_dirs = BaseDirs::new().ok_or(ConfigError::NoHomeDirectory)?;
                base_dirs.home_dir().join(DEFAULT_SESSION_DIR)
            }
        };

        // Optional: HOOKBOARD_REQUEST_TIMEOUT_SECS (default: 30, must be > 0)
        let request_timeout = match env::var("HOOKBOARD_REQUEST_TIMEOUT_SECS") {
            Ok(val) => {
                let secs = val.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                    key: "HOOKBOARD_REQUEST_TIMEOUT_SECS".to_string(),
                    message: format!("expected positive integer, got '{val}'"),
                })?;
                if secs == 0 {
                    return Err(ConfigError::InvalidValue {
                        key: "HOOKBOARD_REQUEST_TIMEOUT_SECS".to_string(),
                        message: "timeout must be at least 1 second".to_string(),
                    });
                }
                Duration::from_secs(secs)
            }
            Err(_) => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        };

        // Optional: HOOKBOARD_INTERCEPT_AUTH_ENDPOINTS (default: true)
        let intercept_policy = match env::var("HOOKBOARD_INTERCEPT_AUTH_ENDPOINTS") {
            Ok(val) => match parse_bool(&val) {
                Some(true) => InterceptPolicy::AllRequests,
                Some(false) => InterceptPolicy::ExcludeAuthEndpoints,
                None => {
                    return Err(ConfigError::InvalidValue {
                        key: "HOOKBOARD_INTERCEPT_AUTH_ENDPOINTS".to_string(),
                        message: format!("expected true or false, got '{val}'"),
                    });
                }
            },
            Err(_) => InterceptPolicy::default(),
        };

        Ok(Self {
            api_url,
            session_dir,
            request_timeout,
            intercept_policy,
        })
    }
}

/// Accepts absolute http(s) URLs with a host.
fn validate_api_url(value: &str) -> Result<(), String> {
    let url = Url::parse(value).map_err(|e| format!("invalid URL '{value}': {e}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("expected an http(s) URL, got '{value}'"));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(format!("URL '{value}' has no host"));
    }
    Ok(())
}

fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
