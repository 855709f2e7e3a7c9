//! # Error Taxonomy
//!
//! Error types for the anchoring pipeline. The public pipeline boundary
//! converts these into failure outcomes; they never cross into caller code
//! as panics or raw errors, because issue creation must not fail on
//! blockchain unavailability.

use thiserror::Error;

use crate::entities::TxStatus;

/// Errors raised inside the anchoring pipeline.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnchorError {
    /// Anchoring is switched off by configuration.
    #[error("anchoring disabled by configuration")]
    Disabled,

    /// Event logging is off; the service runs read-only.
    #[error("event logging disabled (read-only mode)")]
    ReadOnly,

    /// No usable signing key was configured.
    #[error("no signing key configured (read-only mode)")]
    NoWallet,

    /// The private key could not be parsed.
    #[error("invalid signing key: {0}")]
    InvalidKey(String),

    /// No candidate endpoint reported the expected chain id.
    #[error("no endpoint matched chain id {expected}")]
    NoEndpoint {
        /// The chain id the configuration expects.
        expected: u64,
    },

    /// A JSON-RPC call failed at, or below, the transport layer.
    #[error("rpc error: {0}")]
    Rpc(String),

    /// Payload encoding or transaction signing failed.
    #[error("transaction build failed: {0}")]
    Encoding(String),

    /// The node rejected the broadcast.
    #[error("broadcast rejected: {0}")]
    Submission(String),

    /// No receipt appeared within the wait bound.
    #[error("no receipt within {waited_secs}s")]
    ReceiptTimeout {
        /// Seconds waited before giving up.
        waited_secs: u64,
    },

    /// The receipt reported on-chain failure.
    #[error("transaction {hash} reverted in block {block}")]
    Reverted {
        /// Hash of the reverted transaction.
        hash: String,
        /// Block that included the reverted transaction.
        block: u64,
    },
}

impl AnchorError {
    /// True for errors that short-circuit before any network I/O.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Disabled | Self::ReadOnly | Self::NoWallet | Self::InvalidKey(_))
    }

    /// True when the failure means "service unavailable" rather than a
    /// broken submission.
    #[must_use]
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::NoEndpoint { .. })
    }
}

/// Rejected transaction-record status transition.
///
/// Terminal states have no outgoing transitions; `Pending` may only move to
/// `Confirmed` or `Failed`.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("invalid status transition: {from} -> {to}")]
pub struct TransitionError {
    /// Status before the attempted transition.
    pub from: TxStatus,
    /// Status the caller attempted to reach.
    pub to: TxStatus,
}
