//! Client configuration
//!
//! Loaded from defaults, a JSON file or environment variables.

use crate::{BsvaliasError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the bsvalias client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Request timeout in seconds, applied by the HTTP transport
    pub timeout_secs: u64,
    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: format!("bsvalias-rs/{}", crate::VERSION),
        }
    }
}

impl ClientConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| BsvaliasError::config(format!("Failed to read config file: {}", e)))?;

        let config: ClientConfig = serde_json::from_str(&content)
            .map_err(|e| BsvaliasError::config(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(timeout) = std::env::var("BSVALIAS_TIMEOUT_SECS") {
            config.timeout_secs = timeout.parse().map_err(|e| {
                BsvaliasError::config(format!("Invalid BSVALIAS_TIMEOUT_SECS: {}", e))
            })?;
        }

        if let Ok(user_agent) = std::env::var("BSVALIAS_USER_AGENT") {
            config.user_agent = user_agent;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(BsvaliasError::config("Timeout must be greater than zero"));
        }

        if self.user_agent.trim().is_empty() {
            return Err(BsvaliasError::config("User agent cannot be empty"));
        }

        Ok(())
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs();
        self
    }

    /// Set the user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// The request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
