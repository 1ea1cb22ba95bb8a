//! Backend API configuration.

use std::time::Duration;
use url::Url;

/// Where the booking backend lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Root URL of the backend, e.g. `https://api.example.com`.
    pub base_url: Url,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl ApiConfig {
    /// Create a new ApiConfig with the default 30 second timeout.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
