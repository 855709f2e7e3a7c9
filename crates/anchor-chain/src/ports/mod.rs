//! # Ports
//!
//! Async traits the pipeline depends on, with mock implementations for
//! tests.

pub mod outbound;

pub use outbound::{ChainRpc, MockChainRpc, MockConnector, RpcConnector, TxReceipt};
