//! # Bus Subscriber
//!
//! The receiving side of the notification bus.

use thiserror::Error;
use tokio::sync::broadcast;
use tracing::debug;

use crate::events::{EventFilter, LedgerEvent};

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The bus was dropped.
    #[error("notification bus closed")]
    Closed,
}

/// A subscription handle for receiving ledger events.
///
/// Owns an independent broadcast receiver; dropping the handle unsubscribes.
/// Lag on this handle (consumer slower than the ledger) drops the oldest
/// events for this subscriber only and delivery continues.
pub struct Subscription {
    receiver: broadcast::Receiver<LedgerEvent>,
    filter: EventFilter,
}

impl Subscription {
    pub(crate) fn new(receiver: broadcast::Receiver<LedgerEvent>, filter: EventFilter) -> Self {
        Self { receiver, filter }
    }

    /// Receive the next event that matches the filter.
    ///
    /// Returns `None` once the bus is dropped.
    pub async fn recv(&mut self) -> Option<LedgerEvent> {
        loop {
            let event = match self.receiver.recv().await {
                Ok(e) => e,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "subscriber lagged; events dropped for this subscriber");
                    continue;
                }
            };

            if self.filter.matches(&event) {
                return Some(event);
            }
        }
    }

    /// Receive without blocking.
    ///
    /// `Ok(None)` means no matching event is ready right now.
    pub fn try_recv(&mut self) -> Result<Option<LedgerEvent>, SubscriptionError> {
        loop {
            let event = match self.receiver.try_recv() {
                Ok(e) => e,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            };

            if self.filter.matches(&event) {
                return Ok(Some(event));
            }
        }
    }

    /// The filter this subscription was created with.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}
