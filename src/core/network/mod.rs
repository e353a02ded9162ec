pub mod async_query;
pub mod classifier;
pub mod debug_logger;
pub mod notification;
pub mod probe;
pub mod signal_feed;
pub mod single_flight;
pub mod state_machine;
pub mod status_renderer;
pub mod types;

// Re-export commonly used items
pub use async_query::{AttachableAsyncQuery, QueryObserver, QueryResult, QueryStatus};
pub use classifier::{Classification, ConnectivityClassifier, ConnectivitySource, WifiIdentitySource};
pub use debug_logger::{get_debug_logger, EnhancedDebugLogger};
pub use notification::{NotificationSink, Subscription};
pub use probe::{HostReachabilityProbe, ProbeReport, ReachabilityProbe};
pub use signal_feed::{run_feed, FeedLine, SnapshotSource};
pub use single_flight::{SingleFlightGuard, SingleFlightPermit};
pub use state_machine::{Baseline, ConnectivityStateMachine, Transition};
pub use status_renderer::StatusRenderer;
pub use types::*;
