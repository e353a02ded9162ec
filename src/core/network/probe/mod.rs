//! Host Reachability Probing
//!
//! Best-effort "does this host answer" check:
//! - Host normalization (scheme stripping, scheme defaulting)
//! - DNS resolution as a low-level pre-check
//! - HEAD request with bounded timeouts and `Connection: close`
//! - Status classification that treats any live HTTP server as reachable

pub mod checker;
pub mod client;
pub mod resolver;
pub mod url;

// Re-export public API
pub use checker::{is_reachable_status, HostReachabilityProbe, ProbeReport, ReachabilityProbe, REACHABLE_STATUS_CODES};
pub use client::{IsahcProbeClient, ProbeHttpClient, ProbeTimeouts};
pub use resolver::{HostResolver, TokioResolver};
pub use url::{ProbeTarget, UrlError};
