//! # Domain Entities
//!
//! Transaction records, their status state machine, endpoints, and the
//! derived statistics snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::TransitionError;
use crate::payload::EventPayload;

/// A candidate JSON-RPC endpoint and the chain id it is expected to report.
///
/// Immutable; constructed from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// HTTP(S) URL of the node.
    pub url: String,
    /// Chain id this endpoint must self-report to be usable.
    pub chain_id: u64,
}

impl Endpoint {
    /// Create an endpoint candidate.
    #[must_use]
    pub fn new(url: impl Into<String>, chain_id: u64) -> Self {
        Self {
            url: url.into(),
            chain_id,
        }
    }
}

/// Status of one anchoring attempt.
///
/// State machine: `Pending -> Confirmed` | `Pending -> Failed`, or direct
/// `Error` when signing/broadcast threw before a hash existed. Terminal
/// states have no exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    /// Broadcast accepted into the node's pending pool; awaiting a receipt.
    Pending,
    /// Receipt found with on-chain success.
    Confirmed,
    /// Receipt reported a revert, or no receipt arrived within the bound.
    Failed,
    /// Signing or broadcast itself failed before a hash was obtained.
    Error,
}

impl TxStatus {
    /// True once no further transition is possible.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Whether the state machine permits `self -> next`.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed) | (Self::Pending, Self::Failed)
        )
    }

    /// Lowercase wire/display form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Failed => "failed",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for TxStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in the in-memory transaction ledger.
///
/// Created the instant a broadcast attempt begins and mutated at most once,
/// by the confirmation tracker, to reach a terminal status. Never deleted
/// during the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxRecord {
    /// Stable identity, assigned before any hash exists.
    pub id: Uuid,

    /// Transaction hash (`0x`-hex). Empty until broadcast succeeds.
    pub tx_hash: String,

    /// The civic event this attempt anchors.
    pub payload: EventPayload,

    /// When the broadcast attempt began.
    pub submitted_at: DateTime<Utc>,

    /// When the receipt confirmed the transaction, if it did.
    pub confirmed_at: Option<DateTime<Utc>>,

    /// Current status; transitions are monotonic.
    pub status: TxStatus,

    /// Block that included the transaction. Set iff confirmed.
    pub block_number: Option<u64>,

    /// Gas consumed on chain. Set iff confirmed.
    pub gas_used: Option<u64>,

    /// Gas price (wei) the transaction was broadcast with.
    pub gas_price_wei: u128,

    /// Total cost in wei (`gas_used * gas_price_wei`). Zero until confirmed.
    pub gas_cost_wei: u128,

    /// Seconds from submission to terminal status. Zero for pre-broadcast
    /// errors.
    pub duration_secs: f64,

    /// Failure description, when there is one.
    pub error: Option<String>,
}

impl TxRecord {
    /// Record for a broadcast that was accepted into the pending pool.
    #[must_use]
    pub fn pending(tx_hash: impl Into<String>, payload: EventPayload, gas_price_wei: u128) -> Self {
        Self {
            id: Uuid::new_v4(),
            tx_hash: tx_hash.into(),
            payload,
            submitted_at: Utc::now(),
            confirmed_at: None,
            status: TxStatus::Pending,
            block_number: None,
            gas_used: None,
            gas_price_wei,
            gas_cost_wei: 0,
            duration_secs: 0.0,
            error: None,
        }
    }

    /// Record for an attempt that failed before a hash was obtained.
    ///
    /// Appended to the ledger exactly like a pending record so the session
    /// history stays complete.
    #[must_use]
    pub fn broadcast_error(payload: EventPayload, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tx_hash: String::new(),
            payload,
            submitted_at: Utc::now(),
            confirmed_at: None,
            status: TxStatus::Error,
            block_number: None,
            gas_used: None,
            gas_price_wei: 0,
            gas_cost_wei: 0,
            duration_secs: 0.0,
            error: Some(message.into()),
        }
    }

    /// Transition `Pending -> Confirmed`, filling the receipt-derived fields.
    pub fn confirm(
        &mut self,
        block_number: u64,
        gas_used: u64,
        at: DateTime<Utc>,
    ) -> Result<(), TransitionError> {
        self.transition(TxStatus::Confirmed)?;
        self.block_number = Some(block_number);
        self.gas_used = Some(gas_used);
        self.gas_cost_wei = u128::from(gas_used) * self.gas_price_wei;
        self.confirmed_at = Some(at);
        self.duration_secs = elapsed_secs(self.submitted_at, at);
        Ok(())
    }

    /// Transition `Pending -> Failed` (revert and timeout both land here;
    /// only the message differs).
    pub fn fail(&mut self, reason: impl Into<String>, at: DateTime<Utc>) -> Result<(), TransitionError> {
        self.transition(TxStatus::Failed)?;
        self.error = Some(reason.into());
        self.duration_secs = elapsed_secs(self.submitted_at, at);
        Ok(())
    }

    fn transition(&mut self, next: TxStatus) -> Result<(), TransitionError> {
        if !self.status.can_transition_to(next) {
            return Err(TransitionError {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

fn elapsed_secs(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds().max(0) as f64 / 1000.0
}

/// Statistics derived from a ledger snapshot. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerStats {
    /// Total anchoring attempts this session.
    pub total: usize,
    /// Attempts still awaiting a receipt.
    pub pending: usize,
    /// Attempts confirmed on chain.
    pub confirmed: usize,
    /// Attempts that reverted or timed out.
    pub failed: usize,
    /// Attempts that failed before broadcast.
    pub errored: usize,
    /// `confirmed / total * 100`; zero when the ledger is empty.
    pub success_rate: f64,
    /// Mean seconds to a terminal status, over entries with a measured
    /// duration only.
    pub avg_confirmation_secs: f64,
    /// Sum of gas costs over confirmed entries, in wei.
    pub total_gas_cost_wei: u128,
}
