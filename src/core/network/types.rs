// Core types for connectivity tracking and reachability probing
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Classified connectivity state of the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConnectivityState {
    /// No active network
    NoNetwork,
    /// Active network is WiFi (or WiMAX)
    ConnectedWiFi,
    /// Active network is cellular
    ConnectedMobile,
    /// Active network is some other recognized transport (ethernet, bluetooth, vpn)
    ConnectedOther,
    /// Signal was ambiguous or the transport is not recognized
    #[default]
    Unknown,
}

impl ConnectivityState {
    /// Whether this state means a usable network is attached
    pub fn is_available(&self) -> bool {
        matches!(
            self,
            ConnectivityState::ConnectedWiFi
                | ConnectivityState::ConnectedMobile
                | ConnectivityState::ConnectedOther
        )
    }
}

impl std::fmt::Display for ConnectivityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectivityState::NoNetwork => write!(f, "no_network"),
            ConnectivityState::ConnectedWiFi => write!(f, "wifi"),
            ConnectivityState::ConnectedMobile => write!(f, "mobile"),
            ConnectivityState::ConnectedOther => write!(f, "other"),
            ConnectivityState::Unknown => write!(f, "unknown"),
        }
    }
}

/// Opaque token identifying a specific network attachment point
///
/// Two observations with equal identity and equal state describe the same
/// network. WiFi identities are derived from SSID+BSSID so that hopping
/// between two access points is visible even though both are `ConnectedWiFi`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkIdentity(String);

impl NetworkIdentity {
    pub const MOBILE: &'static str = "MOBILE";
    pub const OTHER: &'static str = "OTHER";
    pub const WIFI_UNKNOWN: &'static str = "WIFI";

    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn mobile() -> Self {
        Self::new(Self::MOBILE)
    }

    pub fn other() -> Self {
        Self::new(Self::OTHER)
    }

    /// Composite WiFi token; SSID and BSSID are hashed so they never leak into logs
    pub fn wifi(info: &WifiInfo) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(info.ssid.as_bytes());
        hasher.update([0u8]);
        hasher.update(info.bssid.to_ascii_lowercase().as_bytes());
        let digest = hasher.finalize();
        let hex: String = digest[..8].iter().map(|b| format!("{:02x}", b)).collect();
        Self(format!("WIFI:{}", hex))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NetworkIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Platform network transport type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkType {
    Wifi,
    Wimax,
    Mobile,
    Ethernet,
    Bluetooth,
    Vpn,
    #[serde(other)]
    Unrecognized,
}

/// Link state reported by the platform for a network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LinkState {
    Connected,
    Connecting,
    #[default]
    Disconnected,
}

/// Answer of the synchronous "current active network" query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveNetwork {
    pub network_type: NetworkType,
    #[serde(default)]
    pub link: LinkState,
}

/// Raw connectivity-change signal as delivered by the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSignal {
    /// Transport the signal is about
    pub network_type: NetworkType,
    /// Link state carried by the signal
    #[serde(default)]
    pub link: LinkState,
    /// Free-form platform metadata (reason, extra info)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<String>,
}

/// Currently associated WiFi access point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiInfo {
    pub ssid: String,
    pub bssid: String,
}

/// Bit-flags naming the transport that carried a successful check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransportFlags(u8);

impl TransportFlags {
    pub const NONE: TransportFlags = TransportFlags(0);
    pub const WIFI: TransportFlags = TransportFlags(1);
    pub const MOBILE: TransportFlags = TransportFlags(1 << 1);
    pub const OTHER: TransportFlags = TransportFlags(1 << 2);

    pub fn from_state(state: ConnectivityState) -> Self {
        match state {
            ConnectivityState::ConnectedWiFi => Self::WIFI,
            ConnectivityState::ConnectedMobile => Self::MOBILE,
            ConnectivityState::ConnectedOther => Self::OTHER,
            ConnectivityState::NoNetwork | ConnectivityState::Unknown => Self::NONE,
        }
    }

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn contains(&self, other: TransportFlags) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for TransportFlags {
    type Output = TransportFlags;

    fn bitor(self, rhs: TransportFlags) -> TransportFlags {
        TransportFlags(self.0 | rhs.0)
    }
}

/// Outcome of one connectivity transition, with or without a host probe
///
/// Snapshot of the prev/new pair as observed when the transition was handled.
/// A result may be delivered after a later transition already moved the
/// baseline; it never describes the *current* state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReachabilityResult {
    pub prev_available: bool,
    pub new_available: bool,
    /// Whether the configured host answered; false when no probe ran
    pub does_host_respond: bool,
    pub prev_state: ConnectivityState,
    pub new_state: ConnectivityState,
    pub prev_identity: Option<NetworkIdentity>,
    pub new_identity: Option<NetworkIdentity>,
}

/// Network monitoring errors
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("Home directory not found")]
    HomeDirNotFound,
    #[error("Config read error: {0}")]
    ConfigReadError(String),
    #[error("Config parse error: {0}")]
    ConfigParseError(String),
    #[error("Invalid config: {0}")]
    ConfigInvalid(String),
    #[error("Input parse error: {0}")]
    InputParseError(String),
    #[error("HTTP error: {0}")]
    HttpError(String),
    #[error("No async runtime available")]
    RuntimeUnavailable,
    #[error("URL error: {0}")]
    UrlError(#[from] crate::core::network::probe::url::UrlError),
}

impl From<std::io::Error> for NetworkError {
    fn from(error: std::io::Error) -> Self {
        NetworkError::ConfigReadError(error.to_string())
    }
}

impl From<serde_json::Error> for NetworkError {
    fn from(error: serde_json::Error) -> Self {
        NetworkError::InputParseError(error.to_string())
    }
}

impl From<toml::de::Error> for NetworkError {
    fn from(error: toml::de::Error) -> Self {
        NetworkError::ConfigParseError(error.to_string())
    }
}

// Timestamp standardization
/// Generate standardized local timezone ISO-8601 timestamp
///
/// ```text
/// "2025-01-25T10:30:45-08:00"
/// ```
pub fn get_local_timestamp() -> String {
    chrono::Local::now().to_rfc3339()
}
