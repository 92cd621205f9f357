//! Configuration module

use std::time::Duration;

use thiserror::Error;

use crate::constants;

/// Console configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Audit store origin (without the `/api/v1` prefix)
    pub api_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Dashboard refresh interval in seconds
    pub refresh_interval_secs: u64,

    /// How many recent high-risk decisions the dashboard shows
    pub high_risk_limit: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid audit store URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_url: constants::DEFAULT_API_URL.to_string(),
            timeout_secs: constants::DEFAULT_TIMEOUT_SECS,
            refresh_interval_secs: constants::DEFAULT_REFRESH_INTERVAL,
            high_risk_limit: constants::DEFAULT_HIGH_RISK_LIMIT,
        }
    }
}

impl ConsoleConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            api_url: constants::get_api_url(),
            timeout_secs: constants::get_timeout_secs(),
            refresh_interval_secs: constants::get_refresh_interval(),
            high_risk_limit: constants::get_high_risk_limit(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Replace the store URL (CLI override)
    pub fn with_api_url(mut self, url: impl Into<String>) -> Result<Self, ConfigError> {
        self.api_url = url.into();
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed = reqwest::Url::parse(&self.api_url).map_err(|e| ConfigError::InvalidUrl {
            url: self.api_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                url: self.api_url.clone(),
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Zero(constants::ENV_TIMEOUT));
        }
        if self.refresh_interval_secs == 0 {
            return Err(ConfigError::Zero(constants::ENV_REFRESH_INTERVAL));
        }
        if self.high_risk_limit == 0 {
            return Err(ConfigError::Zero(constants::ENV_HIGH_RISK_LIMIT));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}
