//! HTTP Client for Reachability Probes
//!
//! Only the status line matters for reachability, so probes issue HEAD
//! requests and never read a body.

use crate::core::network::types::NetworkError;
use std::time::Duration;

use isahc::config::{Configurable, RedirectPolicy};
use isahc::{HttpClient, Request};

/// Connect reference timeout
pub const DEFAULT_CONNECT_TIMEOUT_MS: u32 = 3000;
/// Read timeout applied on top of the connect timeout
pub const DEFAULT_READ_TIMEOUT_MS: u32 = 5000;

/// Bounded timeouts for one probe request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeTimeouts {
    pub connect_ms: u32,
    pub read_ms: u32,
}

impl Default for ProbeTimeouts {
    fn default() -> Self {
        Self {
            connect_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            read_ms: DEFAULT_READ_TIMEOUT_MS,
        }
    }
}

impl ProbeTimeouts {
    /// Upper bound for the whole request
    pub fn total(&self) -> Duration {
        Duration::from_millis(self.connect_ms as u64 + self.read_ms as u64)
    }
}

/// HTTP client abstraction for dependency injection and testing
#[async_trait::async_trait]
pub trait ProbeHttpClient: Send + Sync {
    /// Execute a HEAD request and return the response status
    ///
    /// # Implementation Requirements
    /// * Must send `Connection: close`
    /// * Must honor both timeouts
    /// * Transport failures are reported as `Err`, never as a status code
    async fn head(&self, url: String, timeouts: ProbeTimeouts) -> Result<u16, String>;
}

/// Production probe client implementation using isahc
pub struct IsahcProbeClient {
    client: HttpClient,
}

#[async_trait::async_trait]
impl ProbeHttpClient for IsahcProbeClient {
    async fn head(&self, url: String, timeouts: ProbeTimeouts) -> Result<u16, String> {
        let request = Request::head(&url)
            .connect_timeout(Duration::from_millis(timeouts.connect_ms as u64))
            .timeout(timeouts.total())
            .header("Connection", "close")
            .header("User-Agent", concat!("netreach/", env!("CARGO_PKG_VERSION")))
            .body(Vec::new())
            .map_err(|e| format!("Probe request creation failed: {}", e))?;

        let response = self
            .client
            .send_async(request)
            .await
            .map_err(|e| format!("Probe request failed: {}", e))?;

        Ok(response.status().as_u16())
    }
}

impl IsahcProbeClient {
    pub fn new() -> Result<Self, NetworkError> {
        let client = HttpClient::builder()
            .redirect_policy(RedirectPolicy::Limit(3))
            .build()
            .map_err(|e| {
                NetworkError::HttpError(format!("Failed to create probe client: {}", e))
            })?;
        Ok(Self { client })
    }
}
