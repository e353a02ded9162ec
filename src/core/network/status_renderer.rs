// One-line status rendering for connectivity and query results
use crate::core::network::async_query::{QueryResult, QueryStatus};
use crate::core::network::state_machine::Baseline;
use crate::core::network::types::{ConnectivityState, ReachabilityResult, TransportFlags};

/// Renders connectivity status for terminal display
pub struct StatusRenderer;

impl StatusRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Emoji: 🟢/🟡/🔴/⚪ map to `reachable/unreachable/no network/unknown`
    pub fn render_result(&self, result: &ReachabilityResult) -> String {
        let emoji = match (result.new_state, result.does_host_respond) {
            (ConnectivityState::NoNetwork, _) => "🔴",
            (ConnectivityState::Unknown, _) => "⚪",
            (_, true) => "🟢",
            (_, false) => "🟡",
        };

        let transition = if result.prev_state == result.new_state {
            self.state_label(result.new_state).to_string()
        } else {
            format!(
                "{} → {}",
                self.state_label(result.prev_state),
                self.state_label(result.new_state)
            )
        };

        if result.new_available {
            let verdict = if result.does_host_respond { "host up" } else { "host down" };
            format!("{} {} | {}", emoji, transition, verdict)
        } else {
            format!("{} {}", emoji, transition)
        }
    }

    pub fn render_query(&self, result: &QueryResult) -> String {
        match result.status {
            QueryStatus::Ok => format!(
                "🟢 {} reachable via {}",
                result.host,
                self.transport_label(result.transports)
            ),
            QueryStatus::ServerUnreachable => format!("🟡 {} unreachable", result.host),
            QueryStatus::NoNetworkConnection => "🔴 No network connection".to_string(),
            QueryStatus::Indeterminate => "⚪ No host to check".to_string(),
        }
    }

    pub fn render_baseline(&self, baseline: &Baseline) -> String {
        let label = self.state_label(baseline.state);
        match baseline.host_responds {
            Some(true) => format!("🟢 {} | host up", label),
            Some(false) => format!("🟡 {} | host down", label),
            None if baseline.available => format!("⚪ {} | host unchecked", label),
            None => format!("🔴 {}", label),
        }
    }

    fn state_label(&self, state: ConnectivityState) -> &'static str {
        match state {
            ConnectivityState::NoNetwork => "No network",
            ConnectivityState::ConnectedWiFi => "WiFi",
            ConnectivityState::ConnectedMobile => "Mobile",
            ConnectivityState::ConnectedOther => "Other",
            ConnectivityState::Unknown => "Unknown",
        }
    }

    fn transport_label(&self, transports: TransportFlags) -> String {
        let mut labels = Vec::new();
        if transports.contains(TransportFlags::WIFI) {
            labels.push("WiFi");
        }
        if transports.contains(TransportFlags::MOBILE) {
            labels.push("Mobile");
        }
        if transports.contains(TransportFlags::OTHER) {
            labels.push("Other");
        }
        if labels.is_empty() {
            "unknown transport".to_string()
        } else {
            labels.join("+")
        }
    }
}

impl Default for StatusRenderer {
    fn default() -> Self {
        Self::new()
    }
}
