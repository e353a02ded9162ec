// Publish/subscribe channel for connectivity events
use crate::config::defaults::MAX_EVENT_CAPACITY;
use crate::core::network::debug_logger::get_debug_logger;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

/// Broadcast sink decoupling the state machine from its observers
///
/// A subscription lives exactly as long as its `Subscription` handle; dropping
/// the handle unsubscribes, so the sink never keeps an observer alive.
pub struct NotificationSink<E> {
    tx: broadcast::Sender<E>,
}

impl<E: Clone + Send + 'static> NotificationSink<E> {
    /// `capacity` bounds how far a slow subscriber may lag before it misses events
    ///
    /// Clamped to `1..=MAX_EVENT_CAPACITY`.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.clamp(1, MAX_EVENT_CAPACITY));
        Self { tx }
    }

    /// Deliver `event` to every live subscriber; returns how many received it
    pub fn publish(&self, event: E) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> Subscription<E> {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }

    pub fn has_subscribers(&self) -> bool {
        self.tx.receiver_count() > 0
    }
}

impl<E> Clone for NotificationSink<E> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

/// Receiving side of a `NotificationSink`
pub struct Subscription<E> {
    rx: broadcast::Receiver<E>,
}

impl<E: Clone + Send + 'static> Subscription<E> {
    /// Wait for the next event; `None` once every sink handle is gone
    pub async fn recv(&mut self) -> Option<E> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(missed)) => {
                    get_debug_logger().debug_sync(
                        "NotificationSink",
                        "subscriber_lagged",
                        &format!("Subscriber missed {} events", missed),
                    );
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next buffered event without waiting
    pub fn try_recv(&mut self) -> Option<E> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }
}
