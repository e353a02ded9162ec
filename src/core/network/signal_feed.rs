//! JSON Lines platform adapter
//!
//! Stands in for the platform connectivity service when running outside a
//! device: every input line is a snapshot of the platform's view,
//!
//! ```text
//! {"active": {"network_type": "wifi", "link": "connected"},
//!  "wifi": {"ssid": "office", "bssid": "aa:bb:cc:dd:ee:ff"},
//!  "signal": {"network_type": "wifi", "link": "connected"}}
//! ```
//!
//! `active` and `wifi` update the synchronous sources; `signal` is the raw
//! change notification. When `signal` is omitted one is synthesized from
//! `active`.

use crate::core::network::classifier::{ConnectivitySource, WifiIdentitySource};
use crate::core::network::debug_logger::get_debug_logger;
use crate::core::network::state_machine::{ConnectivityStateMachine, Transition};
use crate::core::network::types::{ActiveNetwork, LinkState, NetworkError, NetworkType, RawSignal, WifiInfo};
use serde::{Deserialize, Serialize};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// One line of the feed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedLine {
    #[serde(default)]
    pub active: Option<ActiveNetwork>,
    #[serde(default)]
    pub wifi: Option<WifiInfo>,
    #[serde(default)]
    pub signal: Option<RawSignal>,
}

impl FeedLine {
    pub fn parse(line: &str) -> Result<Self, NetworkError> {
        Ok(serde_json::from_str(line)?)
    }

    /// Explicit signal, or one describing the active network
    pub fn effective_signal(&self) -> RawSignal {
        if let Some(signal) = &self.signal {
            return signal.clone();
        }
        match self.active {
            Some(active) => RawSignal {
                network_type: active.network_type,
                link: active.link,
                extra: None,
            },
            None => RawSignal {
                network_type: NetworkType::Unrecognized,
                link: LinkState::Disconnected,
                extra: None,
            },
        }
    }
}

#[derive(Debug, Default)]
struct Snapshot {
    active: Option<ActiveNetwork>,
    wifi: Option<WifiInfo>,
}

/// Connectivity + WiFi source backed by the latest applied snapshot
#[derive(Debug, Default)]
pub struct SnapshotSource {
    snapshot: RwLock<Snapshot>,
}

impl SnapshotSource {
    pub fn new(active: Option<ActiveNetwork>, wifi: Option<WifiInfo>) -> Self {
        Self {
            snapshot: RwLock::new(Snapshot { active, wifi }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Snapshot> {
        self.snapshot.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Snapshot> {
        self.snapshot.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_active(&self, active: Option<ActiveNetwork>) {
        self.write().active = active;
    }

    pub fn set_wifi(&self, wifi: Option<WifiInfo>) {
        self.write().wifi = wifi;
    }

    /// Replace the platform view with the one carried by `line`
    pub fn apply(&self, line: &FeedLine) {
        let mut snapshot = self.write();
        snapshot.active = line.active;
        snapshot.wifi = line.wifi.clone();
    }
}

impl ConnectivitySource for SnapshotSource {
    fn active_network(&self) -> Option<ActiveNetwork> {
        self.read().active
    }
}

impl WifiIdentitySource for SnapshotSource {
    fn current_wifi(&self) -> Option<WifiInfo> {
        self.read().wifi.clone()
    }
}

/// Drive `machine` from a JSON Lines reader until EOF
///
/// Lines are applied strictly in order. Malformed lines are logged and
/// skipped. Returns the number of signals handed to the machine.
pub async fn run_feed<R>(
    reader: R,
    source: &SnapshotSource,
    machine: &ConnectivityStateMachine,
) -> Result<usize, NetworkError>
where
    R: AsyncBufRead + Unpin,
{
    let debug_logger = get_debug_logger();
    let mut lines = reader.lines();
    let mut processed = 0;

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| NetworkError::InputParseError(format!("Failed to read signal feed: {}", e)))?
    {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let feed_line = match FeedLine::parse(line) {
            Ok(feed_line) => feed_line,
            Err(e) => {
                debug_logger.error_sync("SignalFeed", "parse_failed", &e.to_string());
                continue;
            }
        };

        source.apply(&feed_line);
        let transition = machine.on_signal(&feed_line.effective_signal());
        if transition != Transition::Ignored {
            debug_logger.debug_sync("SignalFeed", "signal_applied", &format!("{:?}", transition));
        }
        processed += 1;
    }

    Ok(processed)
}
