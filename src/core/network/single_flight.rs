// Single-flight guard for reachability probes
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Boolean flag ensuring at most one probe is in flight
///
/// `acquire()` is a compare-and-swap, never a blocking lock: losers get
/// `false` immediately and are expected to drop their request. The guard is
/// cheap to clone; clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct SingleFlightGuard {
    running: Arc<AtomicBool>,
}

impl SingleFlightGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark running iff not already running
    pub fn acquire(&self) -> bool {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Mark not running. Idempotent.
    pub fn release(&self) {
        self.running.store(false, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Acquire and wrap the flag in a permit that releases on drop
    ///
    /// Returns `None` when another caller holds the flag.
    pub fn try_permit(&self) -> Option<SingleFlightPermit> {
        if self.acquire() {
            Some(SingleFlightPermit {
                guard: self.clone(),
            })
        } else {
            None
        }
    }
}

/// Scoped ownership of the single-flight flag
///
/// Dropping the permit releases the flag, including during unwinding.
#[derive(Debug)]
pub struct SingleFlightPermit {
    guard: SingleFlightGuard,
}

impl Drop for SingleFlightPermit {
    fn drop(&mut self) {
        self.guard.release();
    }
}
