// Connectivity classification from platform network status
use crate::core::network::types::{
    ActiveNetwork, ConnectivityState, LinkState, NetworkIdentity, NetworkType, RawSignal,
    TransportFlags, WifiInfo,
};
use std::sync::Arc;

/// Platform connectivity source
///
/// Supplies the synchronous "which network is active" query. The
/// asynchronous signal stream is pushed into the state machine separately.
pub trait ConnectivitySource: Send + Sync {
    /// Currently active network, `None` when nothing is attached
    fn active_network(&self) -> Option<ActiveNetwork>;
}

/// Source of the associated WiFi access point, consulted only for WiFi signals
pub trait WifiIdentitySource: Send + Sync {
    fn current_wifi(&self) -> Option<WifiInfo>;
}

/// Result of classifying one raw signal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Signal describes a network that is not the active one
    Ignored,
    Classified {
        state: ConnectivityState,
        identity: Option<NetworkIdentity>,
    },
}

/// Maps platform network status into `ConnectivityState` + `NetworkIdentity`
#[derive(Clone)]
pub struct ConnectivityClassifier {
    source: Arc<dyn ConnectivitySource>,
    wifi: Arc<dyn WifiIdentitySource>,
}

impl ConnectivityClassifier {
    pub fn new(source: Arc<dyn ConnectivitySource>, wifi: Arc<dyn WifiIdentitySource>) -> Self {
        Self { source, wifi }
    }

    /// Classify a raw connectivity-change signal
    ///
    /// Only signals about the active network are authoritative; a signal
    /// about any other transport yields `Classification::Ignored`. With no
    /// active network at all the signal classifies as `NoNetwork`.
    pub fn classify(&self, signal: &RawSignal) -> Classification {
        match self.source.active_network() {
            None => Classification::Classified {
                state: ConnectivityState::NoNetwork,
                identity: None,
            },
            Some(active) if active.network_type != signal.network_type => Classification::Ignored,
            Some(active) => {
                let (state, identity) = self.classify_active(&active);
                Classification::Classified { state, identity }
            }
        }
    }

    /// Synchronous classification of whatever is active right now
    pub fn current(&self) -> (ConnectivityState, Option<NetworkIdentity>) {
        match self.source.active_network() {
            None => (ConnectivityState::NoNetwork, None),
            Some(active) => self.classify_active(&active),
        }
    }

    fn classify_active(&self, active: &ActiveNetwork) -> (ConnectivityState, Option<NetworkIdentity>) {
        match active.link {
            LinkState::Disconnected => (ConnectivityState::NoNetwork, None),
            LinkState::Connecting => (ConnectivityState::Unknown, None),
            LinkState::Connected => match active.network_type {
                NetworkType::Wifi | NetworkType::Wimax => {
                    let identity = match self.wifi.current_wifi() {
                        Some(info) => NetworkIdentity::wifi(&info),
                        None => NetworkIdentity::new(NetworkIdentity::WIFI_UNKNOWN),
                    };
                    (ConnectivityState::ConnectedWiFi, Some(identity))
                }
                NetworkType::Mobile => (ConnectivityState::ConnectedMobile, Some(NetworkIdentity::mobile())),
                NetworkType::Ethernet | NetworkType::Bluetooth | NetworkType::Vpn => {
                    (ConnectivityState::ConnectedOther, Some(NetworkIdentity::other()))
                }
                NetworkType::Unrecognized => (ConnectivityState::Unknown, None),
            },
        }
    }

    pub fn is_network_available(&self) -> bool {
        self.current().0.is_available()
    }

    pub fn is_wifi_connected(&self) -> bool {
        self.current().0 == ConnectivityState::ConnectedWiFi
    }

    pub fn is_mobile_connected(&self) -> bool {
        self.current().0 == ConnectivityState::ConnectedMobile
    }

    /// Transport carrying the active network, empty when none is connected
    pub fn current_transport(&self) -> TransportFlags {
        TransportFlags::from_state(self.current().0)
    }
}
