use std::sync::{Mutex, OnceLock};
use std::sync::atomic::{AtomicU32, Ordering};
use std::io::{Write, BufReader};
use std::path::{Path, PathBuf};
use std::env;
use std::fs::{File, OpenOptions};
use std::collections::HashMap;

use serde::{Serialize, Deserialize};
use chrono::Local;
use uuid::Uuid;
use flate2::{write::GzEncoder, Compression};
use fs2::FileExt;
use regex::Regex;

use crate::core::network::types::get_local_timestamp;

// Hardcoded rotation policy
const LOG_ROTATION_SIZE_MB: u64 = 8;
const MAX_ARCHIVES: u32 = 5;
const ROTATION_CHECK_INTERVAL: u32 = 200;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LogEntry {
    pub timestamp: String,                                  // ISO-8601 with timezone
    pub level: String,                                      // DEBUG, ERROR, NETWORK, QUERY
    pub component: String,
    pub event: String,
    pub message: String,                                    // redacted
    pub correlation_id: Option<String>,
    pub fields: HashMap<String, serde_json::Value>,
}

struct RotatingLogger {
    log_path: PathBuf,
    write_count: AtomicU32,
}

impl RotatingLogger {
    fn new(log_path: PathBuf) -> Self {
        if let Some(parent) = log_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        Self {
            log_path,
            write_count: AtomicU32::new(0),
        }
    }

    fn write_with_rotation(&self, json_line: &str) -> Result<(), std::io::Error> {
        if self.write_count.fetch_add(1, Ordering::Relaxed) % ROTATION_CHECK_INTERVAL == 0 {
            let _ = self.rotate_if_needed(); // Don't let rotation errors stop logging
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;

        writeln!(file, "{}", json_line)?;
        Ok(())
    }

    fn rotate_if_needed(&self) -> Result<(), std::io::Error> {
        if !self.needs_rotation()? {
            return Ok(());
        }

        // Another process may be rotating the same file
        let lock_path = self.log_path.with_extension("lock");
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)?;

        match lock_file.try_lock_exclusive() {
            Ok(()) => {
                if self.needs_rotation()? {
                    self.perform_rotation()?;
                }
                let _ = std::fs::remove_file(&lock_path);
                Ok(())
            }
            Err(_) => Ok(()),
        }
    }

    fn needs_rotation(&self) -> Result<bool, std::io::Error> {
        if !self.log_path.exists() {
            return Ok(false);
        }

        let metadata = std::fs::metadata(&self.log_path)?;
        Ok(metadata.len() >= LOG_ROTATION_SIZE_MB * 1024 * 1024)
    }

    fn base_name_and_dir(&self) -> Result<(String, &Path), std::io::Error> {
        let invalid = || std::io::Error::new(std::io::ErrorKind::InvalidInput, "invalid log path");
        let base_name = self
            .log_path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(invalid)?
            .to_string();
        let dir = self.log_path.parent().ok_or_else(invalid)?;
        Ok((base_name, dir))
    }

    fn perform_rotation(&self) -> Result<(), std::io::Error> {
        let (base_name, dir) = self.base_name_and_dir()?;
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let archive_path = dir.join(format!("{}.{}.gz", base_name, timestamp));

        // move aside, compress, remove
        let temp_path = self.log_path.with_extension("rotating");
        std::fs::rename(&self.log_path, &temp_path)?;

        let source_file = File::open(&temp_path)?;
        let target_file = File::create(&archive_path)?;
        let mut encoder = GzEncoder::new(target_file, Compression::default());
        std::io::copy(&mut BufReader::new(source_file), &mut encoder)?;
        encoder.finish()?;

        std::fs::remove_file(&temp_path)?;

        let _ = self.cleanup_old_archives();

        Ok(())
    }

    fn cleanup_old_archives(&self) -> Result<(), std::io::Error> {
        let (base_name, dir) = self.base_name_and_dir()?;
        let prefix = format!("{}.", base_name);

        let mut archives = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();

            if name.starts_with(&prefix) && name.ends_with(".gz") {
                archives.push((entry.path(), entry.metadata()?.modified()?));
            }
        }

        archives.sort_by_key(|(_, modified)| *modified);
        if archives.len() > MAX_ARCHIVES as usize {
            let to_remove = archives.len() - MAX_ARCHIVES as usize;
            for (path, _) in archives.iter().take(to_remove) {
                let _ = std::fs::remove_file(path);
            }
        }

        Ok(())
    }
}

/// JSON Lines debug logger for connectivity and probe events
///
/// Disabled unless `NETREACH_DEBUG` is set to a truthy value. Messages pass
/// through redaction before they are written; URL credentials, bearer tokens
/// and BSSIDs never reach the file.
pub struct EnhancedDebugLogger {
    enabled: bool,
    rotating_logger: Option<Mutex<RotatingLogger>>,
    session_id: String,
    redaction_patterns: Vec<Regex>,
}

impl EnhancedDebugLogger {
    pub fn new() -> Self {
        let enabled = Self::parse_debug_enabled();
        Self::with_log_path(enabled, Self::get_log_path())
    }

    /// Build a logger writing to an explicit path
    pub fn with_log_path(enabled: bool, log_path: PathBuf) -> Self {
        let session_id = Uuid::new_v4().to_string()[..8].to_string();

        let rotating_logger = if enabled {
            Some(Mutex::new(RotatingLogger::new(log_path)))
        } else {
            None
        };

        Self {
            enabled,
            rotating_logger,
            session_id,
            redaction_patterns: Self::compile_redaction_patterns(),
        }
    }

    /// Supports: true/false, 1/0, yes/no, on/off (case insensitive)
    pub fn parse_debug_enabled() -> bool {
        env::var("NETREACH_DEBUG")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "on"))
            .unwrap_or(false)
    }

    fn get_log_path() -> PathBuf {
        let mut log_path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        log_path.push(".netreach");
        log_path.push("netreach-debug.log");
        log_path
    }

    fn compile_redaction_patterns() -> Vec<Regex> {
        let patterns = [
            r"(?i)://[^/\s:@]+:[^/\s@]+@",                 // user:pass@ in URLs
            r"(?i)authorization[:\s]+[^\s\n]+",
            r"(?i)bearer[:\s]+[^\s\n]+",
            r"(?i)token[:\s=]+[^\s\n]+",
            r"(?i)password[:\s=]+[^\s\n]+",
            r"(?i)\b[0-9a-f]{2}(?::[0-9a-f]{2}){5}\b",     // BSSID / MAC
        ];

        patterns
            .iter()
            .filter_map(|pattern| Regex::new(pattern).ok())
            .collect()
    }

    pub fn redact_sensitive_data(&self, text: &str) -> String {
        let mut redacted = text.to_string();

        for regex in &self.redaction_patterns {
            redacted = regex.replace_all(&redacted, "[REDACTED]").to_string();
        }

        redacted
    }

    fn log_sync(
        &self,
        level: &str,
        component: &str,
        event: &str,
        message: &str,
        correlation_id: Option<String>,
        fields: HashMap<String, serde_json::Value>,
    ) {
        if !self.enabled {
            return;
        }

        let entry = LogEntry {
            timestamp: get_local_timestamp(),
            level: level.to_string(),
            component: component.to_string(),
            event: event.to_string(),
            message: self.redact_sensitive_data(message),
            correlation_id: correlation_id.or_else(|| Some(self.session_id.clone())),
            fields,
        };

        if let Some(logger) = &self.rotating_logger {
            if let Ok(logger) = logger.lock() {
                if let Ok(json_line) = serde_json::to_string(&entry) {
                    let _ = logger.write_with_rotation(&json_line);
                }
            }
        }
    }

    pub fn debug_sync(&self, component: &str, event: &str, message: &str) {
        self.log_sync("DEBUG", component, event, message, None, HashMap::new());
    }

    pub fn error_sync(&self, component: &str, event: &str, message: &str) {
        self.log_sync("ERROR", component, event, message, None, HashMap::new());
    }

    // Typed events

    pub fn network_probe_start(&self, host: &str, timeout_ms: u64, correlation_id: String) {
        let mut fields = HashMap::new();
        fields.insert("host".to_string(), serde_json::Value::String(self.redact_sensitive_data(host)));
        fields.insert("timeout_ms".to_string(), serde_json::Value::Number(timeout_ms.into()));

        self.log_sync("NETWORK", "ReachabilityProbe", "probe_start",
                     &format!("Probing {}", host),
                     Some(correlation_id), fields);
    }

    pub fn network_probe_end(&self, reachable: bool, http_status: Option<u16>, duration_ms: u64, correlation_id: String) {
        let mut fields = HashMap::new();
        fields.insert("reachable".to_string(), serde_json::Value::Bool(reachable));
        fields.insert("duration_ms".to_string(), serde_json::Value::Number(duration_ms.into()));

        if let Some(code) = http_status {
            fields.insert("http_status".to_string(), serde_json::Value::Number(code.into()));
        }

        self.log_sync("NETWORK", "ReachabilityProbe", "probe_end",
                     &format!("Probe completed: reachable={} ({}ms)", reachable, duration_ms),
                     Some(correlation_id), fields);
    }

    pub fn transition(&self, prev: &str, new: &str, identity_changed: bool, probing: bool) {
        let mut fields = HashMap::new();
        fields.insert("prev_state".to_string(), serde_json::Value::String(prev.to_string()));
        fields.insert("new_state".to_string(), serde_json::Value::String(new.to_string()));
        fields.insert("identity_changed".to_string(), serde_json::Value::Bool(identity_changed));
        fields.insert("probing".to_string(), serde_json::Value::Bool(probing));

        self.log_sync("NETWORK", "ConnectivityStateMachine", "transition",
                     &format!("Connectivity {} -> {}", prev, new),
                     None, fields);
    }

    pub fn noop_filtered(&self, state: &str) {
        self.log_sync("DEBUG", "ConnectivityStateMachine", "noop_filtered",
                     &format!("Signal repeats current state {}", state),
                     None, HashMap::new());
    }

    pub fn probe_skipped(&self, reason: &str) {
        let mut fields = HashMap::new();
        fields.insert("reason".to_string(), serde_json::Value::String(reason.to_string()));

        self.log_sync("NETWORK", "ConnectivityStateMachine", "probe_skipped",
                     &format!("Probe request dropped: {}", reason),
                     None, fields);
    }

    pub fn query_delivered(&self, status: &str, correlation_id: String) {
        let mut fields = HashMap::new();
        fields.insert("status".to_string(), serde_json::Value::String(status.to_string()));

        self.log_sync("QUERY", "AttachableAsyncQuery", "query_delivered",
                     &format!("Result delivered: {}", status),
                     Some(correlation_id), fields);
    }

    pub fn query_dropped(&self, reason: &str, correlation_id: String) {
        let mut fields = HashMap::new();
        fields.insert("reason".to_string(), serde_json::Value::String(reason.to_string()));

        self.log_sync("QUERY", "AttachableAsyncQuery", "query_dropped",
                     &format!("Result dropped: {}", reason),
                     Some(correlation_id), fields);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn get_session_id(&self) -> &str {
        &self.session_id
    }
}

impl Default for EnhancedDebugLogger {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide logger, configured from the environment on first use
pub fn get_debug_logger() -> &'static EnhancedDebugLogger {
    static LOGGER: OnceLock<EnhancedDebugLogger> = OnceLock::new();
    LOGGER.get_or_init(EnhancedDebugLogger::new)
}
