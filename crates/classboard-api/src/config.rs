//! Client configuration.

use std::time::Duration;

/// Default backend URL.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3040";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Settings for the HTTP collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub timeout_secs: u64,
}

impl ClientConfig {
    /// Resolve from `CLASSBOARD_API_URL` and `CLASSBOARD_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var("CLASSBOARD_API_URL").ok(),
            std::env::var("CLASSBOARD_TIMEOUT_SECS").ok(),
        )
    }

    fn from_vars(api_url: Option<String>, timeout: Option<String>) -> Self {
        let api_url = api_url
            .map(|u| u.trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let timeout_secs = timeout
            .and_then(|t| t.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Self {
            api_url,
            timeout_secs,
        }
    }

    pub fn with_url(api_url: &str) -> Self {
        Self::from_vars(Some(api_url.to_string()), None)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_vars(None, None)
    }
}
