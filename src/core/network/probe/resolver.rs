//! Name resolution pre-check

use std::net::IpAddr;
use std::time::Duration;

/// Resolver abstraction for dependency injection and testing
#[async_trait::async_trait]
pub trait HostResolver: Send + Sync {
    /// Resolve `host` to its addresses
    async fn resolve(&self, host: &str, port: u16) -> Result<Vec<IpAddr>, String>;
}

/// System resolver via `tokio::net::lookup_host`
pub struct TokioResolver {
    timeout: Duration,
}

impl TokioResolver {
    pub fn new(timeout_ms: u32) -> Self {
        Self {
            timeout: Duration::from_millis(timeout_ms as u64),
        }
    }
}

#[async_trait::async_trait]
impl HostResolver for TokioResolver {
    async fn resolve(&self, host: &str, port: u16) -> Result<Vec<IpAddr>, String> {
        // IP literals need no lookup
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(vec![ip]);
        }

        let lookup = tokio::net::lookup_host((host, port));
        let addrs = tokio::time::timeout(self.timeout, lookup)
            .await
            .map_err(|_| format!("Resolution of {} timed out", host))?
            .map_err(|e| format!("Resolution of {} failed: {}", host, e))?;

        let ips: Vec<IpAddr> = addrs.map(|addr| addr.ip()).collect();
        if ips.is_empty() {
            return Err(format!("No addresses for {}", host));
        }
        Ok(ips)
    }
}
