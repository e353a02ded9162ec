//! Re-attachable one-shot reachability query
//!
//! Answers "is the network up and does this host respond" once, in the
//! background, for callers that want a request/response rather than a
//! subscription. The observer is held weakly: a query never keeps its
//! observer alive, and an observer may detach (e.g. while its view is being
//! rebuilt) and attach again later to pick up the buffered result without
//! re-running the check.

use crate::core::network::classifier::ConnectivityClassifier;
use crate::core::network::debug_logger::get_debug_logger;
use crate::core::network::probe::ReachabilityProbe;
use crate::core::network::types::{NetworkError, TransportFlags};
use chrono::{DateTime, Local};
use futures::FutureExt;
use serde::Serialize;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::runtime::Handle;
use tokio::sync::Notify;

/// Final verdict of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryStatus {
    /// No host was given; nothing to check
    Indeterminate,
    NoNetworkConnection,
    ServerUnreachable,
    Ok,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryResult {
    pub status: QueryStatus,
    /// Transport that carried the successful check; empty unless `Ok`
    pub transports: TransportFlags,
    pub host: String,
    /// Creation time of the query (RFC 3339, local timezone)
    pub created_at: String,
}

/// Receiver of query results
pub trait QueryObserver: Send + Sync {
    /// Whether the observer's owning context is still alive
    ///
    /// Results offered to an inactive observer are dropped.
    fn is_active(&self) -> bool {
        true
    }

    fn on_result(&self, result: &QueryResult);
}

struct QueryState {
    observer: Option<Weak<dyn QueryObserver>>,
    result: Option<QueryResult>,
}

/// Cancellable, re-attachable reachability query
///
/// Lifecycle: `Pending → Completed` or `Pending → Cancelled`. The background
/// check computes its result exactly once. The result is delivered at most
/// once automatically on completion and at most once per `attach`.
pub struct AttachableAsyncQuery {
    id: String,
    host: String,
    created_at: DateTime<Local>,
    state: Mutex<QueryState>,
    cancelled: AtomicBool,
    settled: AtomicBool,
    done: Notify,
}

impl AttachableAsyncQuery {
    fn new(host: String, observer: Option<&Arc<dyn QueryObserver>>) -> Self {
        Self {
            id: format!("query_{}", uuid::Uuid::new_v4()),
            host,
            created_at: Local::now(),
            state: Mutex::new(QueryState {
                observer: observer.map(Arc::downgrade),
                result: None,
            }),
            cancelled: AtomicBool::new(false),
            settled: AtomicBool::new(false),
            done: Notify::new(),
        }
    }

    /// Start a query for `host`
    ///
    /// An empty host completes immediately with `Indeterminate` and needs no
    /// runtime. Otherwise the check runs as a spawned task on the current
    /// tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError::RuntimeUnavailable` when `host` is non-empty and
    /// this is called outside a tokio runtime.
    pub fn start(
        host: impl Into<String>,
        classifier: ConnectivityClassifier,
        probe: Arc<dyn ReachabilityProbe>,
        observer: Option<&Arc<dyn QueryObserver>>,
    ) -> Result<Arc<Self>, NetworkError> {
        let host = host.into().trim().to_string();

        if host.is_empty() {
            let query = Arc::new(Self::new(host, observer));
            query.complete(QueryStatus::Indeterminate, TransportFlags::NONE);
            return Ok(query);
        }

        let runtime = Handle::try_current().map_err(|_| NetworkError::RuntimeUnavailable)?;
        let query = Arc::new(Self::new(host, observer));

        let task = query.clone();
        runtime.spawn(async move {
            let (status, transports) = task.run_check(&classifier, probe.as_ref()).await;
            task.complete(status, transports);
        });

        Ok(query)
    }

    async fn run_check(
        &self,
        classifier: &ConnectivityClassifier,
        probe: &dyn ReachabilityProbe,
    ) -> (QueryStatus, TransportFlags) {
        if !classifier.is_network_available() {
            return (QueryStatus::NoNetworkConnection, TransportFlags::NONE);
        }
        let transports = classifier.current_transport();

        let reachable = AssertUnwindSafe(probe.probe(&self.host))
            .catch_unwind()
            .await
            .unwrap_or(false);

        if reachable {
            (QueryStatus::Ok, transports)
        } else {
            (QueryStatus::ServerUnreachable, TransportFlags::NONE)
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, QueryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn complete(&self, status: QueryStatus, transports: TransportFlags) {
        let result = QueryResult {
            status,
            transports,
            host: self.host.clone(),
            created_at: self.created_at.to_rfc3339(),
        };

        let observer = {
            let mut state = self.lock_state();
            if state.result.is_some() {
                return;
            }
            state.result = Some(result.clone());
            state.observer.clone()
        };

        self.post_result(observer, &result);
        self.settled.store(true, Ordering::Release);
        self.done.notify_waiters();
    }

    /// Hand `result` to `observer` unless cancelled, gone or inactive
    fn post_result(&self, observer: Option<Weak<dyn QueryObserver>>, result: &QueryResult) -> bool {
        let debug_logger = get_debug_logger();

        if self.is_cancelled() {
            debug_logger.query_dropped("cancelled", self.id.clone());
            return false;
        }
        let Some(observer) = observer.and_then(|weak| weak.upgrade()) else {
            debug_logger.query_dropped("no observer", self.id.clone());
            return false;
        };
        if !observer.is_active() {
            debug_logger.query_dropped("observer inactive", self.id.clone());
            return false;
        }

        observer.on_result(result);
        debug_logger.query_delivered(&format!("{:?}", result.status), self.id.clone());
        true
    }

    /// Forget the observer; the check keeps running
    pub fn detach(&self) {
        self.lock_state().observer = None;
    }

    /// Install `observer`, delivering the buffered result if the query already finished
    pub fn attach(&self, observer: &Arc<dyn QueryObserver>) {
        let weak = Arc::downgrade(observer);
        let buffered = {
            let mut state = self.lock_state();
            state.observer = Some(weak.clone());
            state.result.clone()
        };

        if let Some(result) = buffered {
            self.post_result(Some(weak), &result);
        }
    }

    /// Best-effort cancellation; the check may still finish but nothing is delivered
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn is_completed(&self) -> bool {
        self.lock_state().result.is_some()
    }

    pub fn result(&self) -> Option<QueryResult> {
        self.lock_state().result.clone()
    }

    /// Wait until the background check finished and its automatic delivery ran
    pub async fn wait(&self) -> QueryResult {
        loop {
            let notified = self.done.notified();
            if self.settled.load(Ordering::Acquire) {
                if let Some(result) = self.result() {
                    return result;
                }
            }
            notified.await;
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn created_at(&self) -> DateTime<Local> {
        self.created_at
    }
}
