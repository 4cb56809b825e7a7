use reqwest::Url;
use thiserror::Error;
use tracing::{debug, warn};

/// Base URL of the prediction service when none is configured
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Environment variable holding the prediction service base URL
pub const API_URL_VAR: &str = "PREDICTION_API_URL";

/// Environment variable overriding the HTTP user agent
pub const USER_AGENT_VAR: &str = "PREDICTION_USER_AGENT";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PREDICTION_API_URL is not a valid URL: {0}")]
    InvalidUrl(String),

    #[error("PREDICTION_API_URL must use http or https, got '{0}'")]
    UnsupportedScheme(String),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Prediction client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the prediction service, without a trailing slash
    pub base_url: String,
    /// Optional user agent sent with every request
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            user_agent: None,
        }
    }
}

impl ClientConfig {
    /// Create a configuration for the given base URL
    pub fn new(base_url: impl Into<String>) -> Result<Self, ConfigError> {
        let config = Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_agent: None,
        };
        config.validate()?;
        Ok(config)
    }

    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(API_URL_VAR)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| {
                debug!("{} not set - using {}", API_URL_VAR, DEFAULT_API_URL);
                DEFAULT_API_URL.to_string()
            });

        let mut config = Self::new(base_url.trim())?;
        config.user_agent = lookup(USER_AGENT_VAR).filter(|v| !v.is_empty());

        if !config.base_url.contains("localhost") && !config.base_url.contains("127.0.0.1") {
            warn!("Prediction service is not local: {}", config.base_url);
        }

        Ok(config)
    }

    /// Check that the base URL parses and uses an HTTP scheme
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{} ({})", self.base_url, e)))?;

        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(ConfigError::UnsupportedScheme(other.to_string())),
        }
    }

    /// Full URL for a service path such as `/predict`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}
