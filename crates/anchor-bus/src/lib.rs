//! # Anchor Bus - Ledger Notification Fan-Out
//!
//! Typed publish/subscribe channel that delivers every ledger append and
//! status update to registered observers (the read-only inspection surface,
//! UI live views, tests).
//!
//! ## Delivery Isolation
//!
//! Each subscriber owns an independent `tokio::sync::broadcast` receiver. A
//! slow, panicking, or dropped consumer cannot affect other subscribers and
//! never propagates back into the ledger mutation path. A lagged receiver
//! skips the missed events and keeps receiving.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │  TxLedger    │                    │  Observer    │
//! │              │    publish()       │              │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  LedgerBus   │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{EventFilter, EventKind, LedgerEvent};
pub use publisher::LedgerBus;
pub use subscriber::{Subscription, SubscriptionError};

/// Maximum events buffered per subscriber before older ones are dropped.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;
