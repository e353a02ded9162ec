/*!
Connectivity state machine with single-flight reachability probing.

Owns the last-known `(available, state, identity)` baseline and turns raw
platform signals into `ReachabilityResult` notifications.

## Transition algorithm

1. **No-op filter**: identical identity, state and availability → discard.
2. **Probe**: network available and a host configured → request a probe,
   even if only the identity changed (switching WiFi access points).
3. **Direct**: otherwise publish a result with `does_host_respond = false`,
   but only when someone is subscribed.
4. The baseline always moves to the new observation.

## Concurrency

`on_signal` never blocks: the baseline lock covers only the
read-modify-write of the triple, and probes run as spawned tasks. At most one
probe is in flight; requests arriving meanwhile are dropped, not queued. The
next connectivity signal is the retry.
*/

use crate::core::network::classifier::{Classification, ConnectivityClassifier};
use crate::core::network::debug_logger::get_debug_logger;
use crate::core::network::notification::{NotificationSink, Subscription};
use crate::core::network::probe::ReachabilityProbe;
use crate::core::network::single_flight::SingleFlightGuard;
use crate::core::network::types::{ConnectivityState, NetworkError, NetworkIdentity, RawSignal, ReachabilityResult};
use futures::FutureExt;
use serde::Serialize;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::runtime::Handle;

/// Last-known connectivity observation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Baseline {
    pub available: bool,
    pub state: ConnectivityState,
    pub identity: Option<NetworkIdentity>,
    /// Outcome of the last probe run for this exact baseline, if any
    pub host_responds: Option<bool>,
}

/// What `on_signal` did with a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Signal was about a non-active network
    Ignored,
    /// Nothing observable changed
    NoOp,
    /// A probe was spawned; its result will be published on completion
    ProbeScheduled,
    /// A probe was wanted but another one is in flight
    ProbeSkipped,
    /// A result was published directly
    Published,
    /// Baseline moved but nobody was listening
    Unobserved,
}

struct BaselineCell {
    baseline: Baseline,
    generation: u64,
}

struct Inner {
    cell: Mutex<BaselineCell>,
    classifier: ConnectivityClassifier,
    probe: Arc<dyn ReachabilityProbe>,
    sink: NotificationSink<ReachabilityResult>,
    guard: SingleFlightGuard,
    host: Option<String>,
    runtime: Handle,
}

impl Inner {
    fn lock_cell(&self) -> MutexGuard<'_, BaselineCell> {
        // The cell holds plain data; a poisoned lock still has a consistent value
        self.cell.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record_probe(&self, generation: u64, responded: bool) {
        let mut cell = self.lock_cell();
        if cell.generation == generation {
            cell.baseline.host_responds = Some(responded);
        }
    }
}

/// Connectivity state machine
///
/// Cheap to clone; clones share baseline, guard and sink.
#[derive(Clone)]
pub struct ConnectivityStateMachine {
    inner: Arc<Inner>,
}

impl ConnectivityStateMachine {
    /// Create a machine bootstrapped from a synchronous classifier query
    ///
    /// An empty `host` disables probing; state and identity are still tracked.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError::RuntimeUnavailable` when called outside a tokio runtime.
    pub fn new(
        classifier: ConnectivityClassifier,
        probe: Arc<dyn ReachabilityProbe>,
        host: Option<String>,
        event_capacity: usize,
    ) -> Result<Self, NetworkError> {
        let runtime = Handle::try_current().map_err(|_| NetworkError::RuntimeUnavailable)?;
        Ok(Self::with_runtime(classifier, probe, host, event_capacity, runtime))
    }

    /// Create a machine whose probes run on `runtime`
    pub fn with_runtime(
        classifier: ConnectivityClassifier,
        probe: Arc<dyn ReachabilityProbe>,
        host: Option<String>,
        event_capacity: usize,
        runtime: Handle,
    ) -> Self {
        let (state, identity) = classifier.current();
        let baseline = Baseline {
            available: state.is_available(),
            state,
            identity,
            host_responds: None,
        };
        let host = host.map(|h| h.trim().to_string()).filter(|h| !h.is_empty());

        Self {
            inner: Arc::new(Inner {
                cell: Mutex::new(BaselineCell {
                    baseline,
                    generation: 0,
                }),
                classifier,
                probe,
                sink: NotificationSink::new(event_capacity),
                guard: SingleFlightGuard::new(),
                host,
                runtime,
            }),
        }
    }

    /// Process one raw connectivity signal, in arrival order
    pub fn on_signal(&self, signal: &RawSignal) -> Transition {
        let debug_logger = get_debug_logger();

        let (state, identity) = match self.inner.classifier.classify(signal) {
            Classification::Ignored => return Transition::Ignored,
            Classification::Classified { state, identity } => (state, identity),
        };
        let available = state.is_available();

        let (prev, generation) = {
            let mut cell = self.inner.lock_cell();
            let prev = cell.baseline.clone();
            if prev.identity == identity && prev.state == state && prev.available == available {
                drop(cell);
                debug_logger.noop_filtered(&state.to_string());
                return Transition::NoOp;
            }

            cell.baseline = Baseline {
                available,
                state,
                identity: identity.clone(),
                host_responds: None,
            };
            cell.generation += 1;
            (prev, cell.generation)
        };

        let probing = available && self.inner.host.is_some();
        debug_logger.transition(
            &prev.state.to_string(),
            &state.to_string(),
            prev.identity != identity,
            probing,
        );

        let pending = ReachabilityResult {
            prev_available: prev.available,
            new_available: available,
            does_host_respond: false,
            prev_state: prev.state,
            new_state: state,
            prev_identity: prev.identity,
            new_identity: identity,
        };

        if probing {
            return self.request_probe(pending, generation);
        }

        if self.inner.sink.has_subscribers() {
            self.inner.sink.publish(pending);
            Transition::Published
        } else {
            Transition::Unobserved
        }
    }

    /// Spawn a probe unless one is already in flight
    ///
    /// The permit moves into the task and is released before the result is
    /// published, whether the probe answered, failed or panicked.
    fn request_probe(&self, pending: ReachabilityResult, generation: u64) -> Transition {
        let Some(host) = self.inner.host.clone() else {
            return Transition::Unobserved;
        };

        let Some(permit) = self.inner.guard.try_permit() else {
            get_debug_logger().probe_skipped("probe already in flight");
            return Transition::ProbeSkipped;
        };

        let inner = self.inner.clone();
        self.inner.runtime.spawn(async move {
            let responded = match AssertUnwindSafe(inner.probe.probe(&host)).catch_unwind().await {
                Ok(responded) => responded,
                Err(_) => {
                    get_debug_logger().error_sync(
                        "ConnectivityStateMachine",
                        "probe_panicked",
                        &format!("Probe of {} aborted", host),
                    );
                    false
                }
            };

            inner.record_probe(generation, responded);
            drop(permit);

            inner.sink.publish(ReachabilityResult {
                does_host_respond: responded,
                ..pending
            });
        });

        Transition::ProbeScheduled
    }

    pub fn subscribe(&self) -> Subscription<ReachabilityResult> {
        self.inner.sink.subscribe()
    }

    pub fn has_subscribers(&self) -> bool {
        self.inner.sink.has_subscribers()
    }

    /// Current baseline
    pub fn snapshot(&self) -> Baseline {
        self.inner.lock_cell().baseline.clone()
    }

    pub fn is_probe_in_flight(&self) -> bool {
        self.inner.guard.is_running()
    }

    pub fn host(&self) -> Option<&str> {
        self.inner.host.as_deref()
    }

    pub fn classifier(&self) -> &ConnectivityClassifier {
        &self.inner.classifier
    }
}
