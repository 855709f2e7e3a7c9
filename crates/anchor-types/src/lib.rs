//! # Shared Types Crate
//!
//! Domain entities, configuration, and the error taxonomy shared by every
//! crate in the CivicAnchor pipeline.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: all cross-crate types are defined here.
//! - **Monotonic Status**: `TxRecord` transitions are enforced by the type
//!   itself, not by callers remembering the rules.
//! - **Derived, Never Stored**: `LedgerStats` is computed from ledger
//!   snapshots on demand and is never persisted.

pub mod config;
pub mod entities;
pub mod errors;
pub mod payload;

pub use config::AnchorConfig;
pub use entities::{Endpoint, LedgerStats, TxRecord, TxStatus};
pub use errors::{AnchorError, TransitionError};
pub use payload::{CivicEventType, EventPayload};

/// Default chain identifier for the anchoring network.
pub const DEFAULT_CHAIN_ID: u64 = 8119;

/// Gas price safety multiplier, expressed as a ratio (numerator/denominator).
///
/// Applied to the node-reported gas price to reduce the chance of the
/// anchoring transaction being deprioritized.
pub const GAS_PRICE_MULTIPLIER: (u128, u128) = (12, 10);

/// Gas limit for a zero-value self-transaction carrying anchoring data.
pub const ANCHOR_GAS_LIMIT: u64 = 100_000;

/// How long the endpoint resolver waits for a chain-id probe.
pub const PROBE_TIMEOUT_SECS: u64 = 10;

/// Fixed interval between receipt polls.
pub const RECEIPT_POLL_INTERVAL_SECS: u64 = 2;

/// Upper bound on the total receipt wait per transaction.
pub const RECEIPT_MAX_WAIT_SECS: u64 = 60;
