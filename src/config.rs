//! Runtime configuration for the vault API endpoint and the session file.
//! Values come from CLI flags or `VAULTGATE_*` environment variables; blank
//! values fall back to defaults. Nothing here is secret.

use crate::api::{build_url_with_base, DEFAULT_TIMEOUT_SECS};
use directories::ProjectDirs;
use std::{path::PathBuf, time::Duration};
use thiserror::Error;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
/// File name of the session record inside the config directory.
pub const SESSION_FILE_NAME: &str = "session.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Unsupported API URL scheme: {0}")]
    UnsupportedScheme(String),
    #[error("API URL has no host")]
    MissingHost,
    #[error("Could not determine a config directory; pass --session-file")]
    NoSessionPath,
    #[error("Timeout must be greater than zero")]
    ZeroTimeout,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_base_url: String,
    pub session_file: PathBuf,
    pub timeout: Duration,
}

impl AppConfig {
    /// Builds a config, validating the base URL and resolving the session path.
    ///
    /// # Errors
    /// Returns an error if the URL is not http(s), the timeout is zero, or no
    /// session path can be resolved.
    pub fn new(
        api_base_url: Option<&str>,
        session_file: Option<PathBuf>,
        timeout_seconds: Option<u64>,
    ) -> Result<Self, ConfigError> {
        let api_base_url = api_base_url
            .and_then(normalize_value)
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        validate_base_url(&api_base_url)?;

        let session_file = match session_file.filter(|path| !path.as_os_str().is_empty()) {
            Some(path) => path,
            None => default_session_file().ok_or(ConfigError::NoSessionPath)?,
        };

        let timeout_seconds = timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_seconds == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            session_file,
            timeout: Duration::from_secs(timeout_seconds),
        })
    }

    /// Full URL for an API path such as `/auth/signin/verify`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        build_url_with_base(&self.api_base_url, path)
    }
}

/// `<config dir>/vaultgate/session.json` for the current user.
#[must_use]
pub fn default_session_file() -> Option<PathBuf> {
    ProjectDirs::from("dev", "vaultgate", "vaultgate")
        .map(|dirs| dirs.config_dir().join(SESSION_FILE_NAME))
}

fn validate_base_url(value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)?;
    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(ConfigError::UnsupportedScheme(scheme.to_string())),
    }
    if url.host().is_none() {
        return Err(ConfigError::MissingHost);
    }
    Ok(())
}

fn normalize_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
