//! Client configuration

use std::sync::Arc;

/// Configuration for connecting to the platform backend.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL (e.g., "http://localhost:5000/api/v1")
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout: u64,
}

impl ClientConfig {
    /// Create a new configuration with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: 30,
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Create an HTTP gateway from this configuration
    pub fn build_gateway(&self) -> Result<Arc<super::HttpGateway>, super::ApiError> {
        Ok(Arc::new(super::HttpGateway::new(self)?))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:5000/api/v1")
    }
}
