//! services/client/src/config.rs
//!
//! Defines the client's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use reqwest::Url;
use std::path::PathBuf;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    /// Origin of the backend; API paths are resolved against it.
    pub api_base_url: Url,
    /// File holding the persisted bearer token.
    pub token_path: PathBuf,
    /// Where the user is sent when authentication is missing or rejected.
    pub login_path: String,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let api_base_url_str =
            std::env::var("UNBIND_API_URL").unwrap_or_else(|_| "http://localhost:8000".to_string());
        let api_base_url = Url::parse(&api_base_url_str).map_err(|e| {
            ConfigError::InvalidValue("UNBIND_API_URL".to_string(), e.to_string())
        })?;
        if api_base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidValue(
                "UNBIND_API_URL".to_string(),
                format!("'{}' cannot be used as a base URL", api_base_url_str),
            ));
        }

        let token_path = std::env::var("UNBIND_TOKEN_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./.unbind/session.json"));

        let login_path =
            std::env::var("UNBIND_LOGIN_PATH").unwrap_or_else(|_| "/auth/login".to_string());

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            api_base_url,
            token_path,
            login_path,
            log_level,
        })
    }

    /// Configuration pointing at `api_base_url` with every other value defaulted.
    pub fn for_base_url(api_base_url: Url) -> Self {
        Self {
            api_base_url,
            token_path: PathBuf::from("./.unbind/session.json"),
            login_path: "/auth/login".to_string(),
            log_level: Level::INFO,
        }
    }
}
