// Default configuration values

use super::types::Config;
use crate::core::network::probe::client::{DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_READ_TIMEOUT_MS};

pub const DEFAULT_EVENT_CAPACITY: usize = 32;
pub const MAX_TIMEOUT_MS: u32 = 30_000;
/// Upper bound for per-subscriber event buffering
pub const MAX_EVENT_CAPACITY: usize = 4096;

impl Default for Config {
    fn default() -> Self {
        Config {
            host: None,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

pub(crate) fn default_connect_timeout_ms() -> u32 {
    DEFAULT_CONNECT_TIMEOUT_MS
}

pub(crate) fn default_read_timeout_ms() -> u32 {
    DEFAULT_READ_TIMEOUT_MS
}

pub(crate) fn default_event_capacity() -> usize {
    DEFAULT_EVENT_CAPACITY
}
