//! # Bus Publisher
//!
//! The publishing side of the notification bus. The ledger is the only
//! publisher; everything else subscribes.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::broadcast;
use tracing::{debug, trace};

use crate::events::{EventFilter, LedgerEvent};
use crate::subscriber::Subscription;
use crate::DEFAULT_CHANNEL_CAPACITY;

/// In-memory notification bus for ledger observers.
///
/// Built on `tokio::sync::broadcast` for multi-consumer semantics: every
/// subscriber gets its own receiver, so a consumer failure is invisible to
/// the ledger and to other consumers.
pub struct LedgerBus {
    /// Broadcast sender for events.
    sender: broadcast::Sender<LedgerEvent>,

    /// Total events published (delivered or not).
    events_published: AtomicU64,

    /// Channel capacity per subscriber.
    capacity: usize,
}

impl LedgerBus {
    /// Create a bus with the default per-subscriber capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a bus with a specific per-subscriber capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            events_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Publish a ledger event to all current subscribers.
    ///
    /// Returns the number of subscribers the event reached. Zero receivers
    /// is not an error; the ledger does not care whether anyone listens.
    pub fn publish(&self, event: LedgerEvent) -> usize {
        self.events_published.fetch_add(1, Ordering::Relaxed);

        match self.sender.send(event) {
            Ok(receivers) => {
                trace!(receivers, "ledger event published");
                receivers
            }
            Err(_) => {
                // No receivers; the event is dropped.
                debug!("ledger event dropped (no subscribers)");
                0
            }
        }
    }

    /// Subscribe to events matching a filter.
    ///
    /// Dropping the returned handle unsubscribes.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(?filter, "new ledger subscription");
        Subscription::new(self.sender.subscribe(), filter)
    }

    /// Number of currently attached subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Total events published since construction.
    #[must_use]
    pub fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }

    /// Per-subscriber channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for LedgerBus {
    fn default() -> Self {
        Self::new()
    }
}
