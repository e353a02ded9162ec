//! Reachability Check
//!
//! Runs the resolution pre-check and the HEAD request for one host and
//! condenses the outcome into a boolean. Every failure mode (bad host,
//! resolution failure, connect timeout, I/O error) becomes `false` and is
//! logged; nothing is propagated to the caller.
//!
//! Probes perform blocking network I/O bounded by the configured timeouts.
//! Never await them from a latency-sensitive context such as a UI or the
//! state machine's signal handler; spawn them on the runtime instead.

use crate::config::Config;
use crate::core::network::debug_logger::get_debug_logger;
use crate::core::network::probe::{
    client::{IsahcProbeClient, ProbeHttpClient, ProbeTimeouts},
    resolver::{HostResolver, TokioResolver},
    url::ProbeTarget,
};
use crate::core::network::types::NetworkError;
use serde::Serialize;
use std::net::IpAddr;
use std::time::Instant;

/// Status codes that prove a live HTTP server
///
/// Client errors such as 400/401/403/405 still mean a server answered; only
/// the request was rejected.
pub const REACHABLE_STATUS_CODES: [u16; 6] = [200, 202, 400, 401, 403, 405];

pub fn is_reachable_status(status_code: u16) -> bool {
    REACHABLE_STATUS_CODES.contains(&status_code)
}

/// Something that can tell whether a host answers
#[async_trait::async_trait]
pub trait ReachabilityProbe: Send + Sync {
    /// Best-effort reachability of `host`; never fails, only answers false
    async fn probe(&self, host: &str) -> bool;
}

/// Diagnostic record of one probe
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    /// Host as configured
    pub requested: String,
    /// Normalized host used for resolution (None if the host did not parse)
    pub host: Option<String>,
    /// First resolved address, if resolution succeeded
    pub resolved: Option<IpAddr>,
    /// URL of the HTTP request
    pub url: Option<String>,
    pub status_code: Option<u16>,
    pub reachable: bool,
    pub elapsed_ms: u64,
    pub error: Option<String>,
}

/// Production reachability probe: resolver pre-check followed by HEAD
pub struct HostReachabilityProbe {
    http_client: Box<dyn ProbeHttpClient>,
    resolver: Box<dyn HostResolver>,
    timeouts: ProbeTimeouts,
}

impl HostReachabilityProbe {
    /// Create a probe with the isahc client and the system resolver
    ///
    /// # Errors
    ///
    /// Returns `NetworkError::HttpError` if HTTP client creation fails.
    pub fn new(timeouts: ProbeTimeouts) -> Result<Self, NetworkError> {
        Ok(Self {
            http_client: Box::new(IsahcProbeClient::new()?),
            resolver: Box::new(TokioResolver::new(timeouts.connect_ms)),
            timeouts,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, NetworkError> {
        Self::new(config.timeouts())
    }

    /// Configure with custom HTTP client (for testing)
    pub fn with_http_client(mut self, client: Box<dyn ProbeHttpClient>) -> Self {
        self.http_client = client;
        self
    }

    /// Configure with custom resolver (for testing)
    pub fn with_resolver(mut self, resolver: Box<dyn HostResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn timeouts(&self) -> ProbeTimeouts {
        self.timeouts
    }

    /// Probe `host` and keep every intermediate observation
    pub async fn probe_report(&self, host: &str) -> ProbeReport {
        let debug_logger = get_debug_logger();
        let start = Instant::now();
        let probe_id = format!("probe_{}", uuid::Uuid::new_v4());

        debug_logger.network_probe_start(host, self.timeouts.total().as_millis() as u64, probe_id.clone());

        let mut report = ProbeReport {
            requested: host.to_string(),
            host: None,
            resolved: None,
            url: None,
            status_code: None,
            reachable: false,
            elapsed_ms: 0,
            error: None,
        };

        let target = match ProbeTarget::parse(host) {
            Ok(target) => target,
            Err(e) => {
                debug_logger.error_sync("ReachabilityProbe", "invalid_host", &format!("{}: {}", host, e));
                report.error = Some(e.to_string());
                report.elapsed_ms = start.elapsed().as_millis() as u64;
                debug_logger.network_probe_end(false, None, report.elapsed_ms, probe_id);
                return report;
            }
        };
        report.host = Some(target.host.clone());
        report.url = Some(target.url.clone());

        // Resolution failure is not fatal: the HTTP request gets its own chance
        match self.resolver.resolve(&target.host, target.port).await {
            Ok(addrs) => report.resolved = addrs.first().copied(),
            Err(e) => {
                debug_logger.debug_sync("ReachabilityProbe", "resolve_failed", &e);
            }
        }

        match self.http_client.head(target.url.clone(), self.timeouts).await {
            Ok(status_code) => {
                report.status_code = Some(status_code);
                report.reachable = is_reachable_status(status_code);
            }
            Err(e) => {
                debug_logger.error_sync("ReachabilityProbe", "request_failed", &e);
                report.error = Some(e);
            }
        }

        report.elapsed_ms = start.elapsed().as_millis() as u64;
        debug_logger.network_probe_end(report.reachable, report.status_code, report.elapsed_ms, probe_id);
        report
    }
}

#[async_trait::async_trait]
impl ReachabilityProbe for HostReachabilityProbe {
    async fn probe(&self, host: &str) -> bool {
        self.probe_report(host).await.reachable
    }
}
