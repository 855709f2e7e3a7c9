//! # Transaction Ledger
//!
//! Ordered, append-only, in-memory store of anchoring attempts. Newest
//! first. Session-local history, not a durable store; linear scans are fine
//! at this scale.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use anchor_bus::{LedgerBus, LedgerEvent};
use anchor_types::{LedgerStats, TransitionError, TxRecord, TxStatus};

use crate::stats::compute_stats;

/// The in-memory transaction ledger.
///
/// All mutation goes through [`TxLedger::append`] and [`TxLedger::update`];
/// both are safe to call from concurrent confirmation-tracker completions.
/// Every mutation publishes on the bus after the write lock is released, so
/// observers can never stall a mutation.
pub struct TxLedger {
    records: RwLock<Vec<TxRecord>>,
    bus: Arc<LedgerBus>,
}

impl TxLedger {
    /// Empty ledger publishing on `bus`.
    #[must_use]
    pub fn new(bus: Arc<LedgerBus>) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            bus,
        }
    }

    /// Insert a record at the newest-first position and notify observers.
    pub fn append(&self, record: TxRecord) {
        debug!(id = %record.id, status = %record.status, "ledger append");
        self.records.write().insert(0, record.clone());
        self.bus.publish(LedgerEvent::Appended(record));
    }

    /// Apply a status transition to the record with `id`, in place.
    ///
    /// The record keeps its position; it is superseded, not re-inserted.
    /// Returns the updated snapshot, or `None` when the record is missing
    /// or the transition is rejected by the state machine.
    pub fn update<F>(&self, id: Uuid, apply: F) -> Option<TxRecord>
    where
        F: FnOnce(&mut TxRecord) -> Result<(), TransitionError>,
    {
        let updated = {
            let mut records = self.records.write();
            let record = records.iter_mut().find(|r| r.id == id)?;
            match apply(record) {
                Ok(()) => record.clone(),
                Err(e) => {
                    warn!(id = %id, error = %e, "ledger update rejected");
                    return None;
                }
            }
        };

        debug!(id = %id, status = %updated.status, "ledger update");
        self.bus.publish(LedgerEvent::Updated(updated.clone()));
        Some(updated)
    }

    /// Snapshot of the full history, newest first.
    ///
    /// Clones defensively; holders cannot mutate history out-of-band.
    #[must_use]
    pub fn all(&self) -> Vec<TxRecord> {
        self.records.read().clone()
    }

    /// Records currently in `status`, newest first.
    #[must_use]
    pub fn by_status(&self, status: TxStatus) -> Vec<TxRecord> {
        self.records
            .read()
            .iter()
            .filter(|r| r.status == status)
            .cloned()
            .collect()
    }

    /// The record carrying `tx_hash`, if any.
    #[must_use]
    pub fn by_hash(&self, tx_hash: &str) -> Option<TxRecord> {
        self.records
            .read()
            .iter()
            .find(|r| !r.tx_hash.is_empty() && r.tx_hash == tx_hash)
            .cloned()
    }

    /// Number of attempts this session.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// True when nothing has been attempted yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Statistics over the current history.
    #[must_use]
    pub fn stats(&self) -> LedgerStats {
        compute_stats(&self.records.read())
    }

    /// The bus this ledger publishes on.
    #[must_use]
    pub fn bus(&self) -> &Arc<LedgerBus> {
        &self.bus
    }
}
