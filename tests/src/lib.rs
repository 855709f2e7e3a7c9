//! # CivicAnchor Test Suite
//!
//! Unified test crate exercising the pipeline across crate boundaries.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── flows.rs      # Submit -> confirm / fail / error choreography
//!     ├── failover.rs   # Endpoint resolution order and identity checks
//!     └── observers.rs  # Ledger bus fan-out and subscriber isolation
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p anchor-tests
//!
//! # By area
//! cargo test -p anchor-tests integration::flows
//! cargo test -p anchor-tests integration::failover
//! ```

#![allow(unused_imports)]
#![allow(dead_code)]

pub mod integration;

/// Route pipeline tracing to the test console. Honors `RUST_LOG`; safe to
/// call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
