//! # Anchor Pipeline
//!
//! The event-anchoring transaction pipeline: takes a civic event, gets it
//! signed, broadcast, and confirmed on the anchoring network, and keeps a
//! session-local ledger of every attempt.
//!
//! ## Control Flow
//!
//! ```text
//! caller ──▶ AnchorService::log_civic_event
//!               │  (resolver already bound an endpoint)
//!               ├─ gas price ×1.2 ─ pending nonce ─ sign ─ broadcast
//!               ├─ TxLedger::append(pending) ──▶ LedgerBus fan-out
//!               └─ return immediately; spawn confirmation tracker
//!                             │
//!                  poll receipt every 2s, up to 60s
//!                             │
//!               TxLedger::update(confirmed|failed) ──▶ LedgerBus fan-out
//! ```
//!
//! The caller is never blocked on confirmation and never sees an error
//! escape: anchoring is best-effort provenance, not a transactional
//! dependency of the primary civic action.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ledger;
pub mod service;
pub mod stats;
pub mod tracker;

pub use ledger::TxLedger;
pub use service::{AnchorOutcome, AnchorService};
pub use stats::compute_stats;
pub use tracker::{track_confirmation, wait_for_receipt};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
