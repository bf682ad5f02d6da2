use crate::config::{AppConfig, ConfigError};
use std::path::PathBuf;

/// Connection settings shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct GlobalArgs {
    pub api_url: Option<String>,
    pub session_file: Option<PathBuf>,
    pub timeout_seconds: Option<u64>,
}

impl GlobalArgs {
    /// # Errors
    /// Returns an error if the settings do not form a valid configuration.
    pub fn config(&self) -> Result<AppConfig, ConfigError> {
        AppConfig::new(
            self.api_url.as_deref(),
            self.session_file.clone(),
            self.timeout_seconds,
        )
    }
}
