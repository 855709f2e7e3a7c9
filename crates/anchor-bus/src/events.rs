//! # Ledger Events
//!
//! Event types that flow through the notification bus. One event fires per
//! ledger mutation, carrying a snapshot of the record after the mutation.

use anchor_types::{TxRecord, TxStatus};

/// A ledger mutation, as delivered to observers.
#[derive(Debug, Clone)]
pub enum LedgerEvent {
    /// A new record entered the ledger (pending broadcast or pre-broadcast
    /// error).
    Appended(TxRecord),

    /// An existing record reached a new status in place.
    Updated(TxRecord),
}

impl LedgerEvent {
    /// The record snapshot this event carries.
    #[must_use]
    pub fn record(&self) -> &TxRecord {
        match self {
            Self::Appended(rec) | Self::Updated(rec) => rec,
        }
    }

    /// Which kind of mutation this is (for filtering).
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Appended(_) => EventKind::Appended,
            Self::Updated(_) => EventKind::Updated,
        }
    }

    /// Status of the record after the mutation.
    #[must_use]
    pub fn status(&self) -> TxStatus {
        self.record().status
    }
}

/// Event kinds for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// New record inserted.
    Appended,
    /// Existing record updated in place.
    Updated,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Kinds to include. Empty means all kinds.
    pub kinds: Vec<EventKind>,
    /// Statuses to include. Empty means all statuses.
    pub statuses: Vec<TxStatus>,
}

impl EventFilter {
    /// Accept every event.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Accept only the given mutation kinds.
    #[must_use]
    pub fn kinds(kinds: Vec<EventKind>) -> Self {
        Self {
            kinds,
            statuses: Vec::new(),
        }
    }

    /// Accept only events whose record holds one of the given statuses.
    #[must_use]
    pub fn statuses(statuses: Vec<TxStatus>) -> Self {
        Self {
            kinds: Vec::new(),
            statuses,
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &LedgerEvent) -> bool {
        let kind_match = self.kinds.is_empty() || self.kinds.contains(&event.kind());
        let status_match = self.statuses.is_empty() || self.statuses.contains(&event.status());
        kind_match && status_match
    }
}
