use super::defaults::{
    default_connect_timeout_ms, default_event_capacity, default_read_timeout_ms, MAX_EVENT_CAPACITY, MAX_TIMEOUT_MS,
};
use crate::core::network::probe::{ProbeTarget, ProbeTimeouts};
use crate::core::network::types::NetworkError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// netreach configuration (stored as ~/.netreach/config.toml)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Host to probe on connectivity changes; absent or empty disables probing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Connect timeout for probe requests
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u32,
    /// Read timeout applied after connecting
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u32,
    /// Buffered events per subscriber before a slow one starts missing events
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl Config {
    /// Default config location: `~/.netreach/config.toml`
    pub fn config_path() -> Result<PathBuf, NetworkError> {
        let home = dirs::home_dir().ok_or(NetworkError::HomeDirNotFound)?;
        Ok(home.join(".netreach").join("config.toml"))
    }

    /// Load the default config file (defaults if missing) and apply env overrides
    pub fn load() -> Result<Self, NetworkError> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self, NetworkError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            NetworkError::ConfigReadError(format!("{}: {}", path.display(), e))
        })?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), NetworkError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Write the default config unless one exists; returns its path
    pub fn init() -> Result<PathBuf, NetworkError> {
        let path = Self::config_path()?;
        if !path.exists() {
            Self::default().save_to(&path)?;
        }
        Ok(path)
    }

    pub fn to_toml(&self) -> Result<String, NetworkError> {
        toml::to_string_pretty(self).map_err(|e| NetworkError::ConfigParseError(e.to_string()))
    }

    /// Validate timeouts, capacity and host
    pub fn check(&self) -> Result<(), NetworkError> {
        if self.connect_timeout_ms == 0 || self.connect_timeout_ms > MAX_TIMEOUT_MS {
            return Err(NetworkError::ConfigInvalid(format!(
                "connect_timeout_ms must be within 1..={}",
                MAX_TIMEOUT_MS
            )));
        }
        if self.read_timeout_ms == 0 || self.read_timeout_ms > MAX_TIMEOUT_MS {
            return Err(NetworkError::ConfigInvalid(format!(
                "read_timeout_ms must be within 1..={}",
                MAX_TIMEOUT_MS
            )));
        }
        if self.event_capacity == 0 || self.event_capacity > MAX_EVENT_CAPACITY {
            return Err(NetworkError::ConfigInvalid(format!(
                "event_capacity must be within 1..={}",
                MAX_EVENT_CAPACITY
            )));
        }
        if let Some(host) = self.probe_host() {
            ProbeTarget::parse(host)?;
        }
        Ok(())
    }

    /// Apply `NETREACH_HOST` and `NETREACH_TIMEOUT_MS`
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("NETREACH_HOST") {
            self.host = Some(host);
        }
        if let Ok(timeout) = std::env::var("NETREACH_TIMEOUT_MS") {
            if let Ok(timeout) = timeout.trim().parse::<u32>() {
                self.connect_timeout_ms = timeout.clamp(1, MAX_TIMEOUT_MS);
            }
        }
    }

    /// Configured host, `None` if absent or blank
    pub fn probe_host(&self) -> Option<&str> {
        self.host.as_deref().map(str::trim).filter(|h| !h.is_empty())
    }

    pub fn timeouts(&self) -> ProbeTimeouts {
        ProbeTimeouts {
            connect_ms: self.connect_timeout_ms,
            read_ms: self.read_timeout_ms,
        }
    }
}
