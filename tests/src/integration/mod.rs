//! Cross-crate integration tests.

pub mod failover;
pub mod flows;
pub mod observers;
