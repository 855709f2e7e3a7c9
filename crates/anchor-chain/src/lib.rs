//! # Anchor Chain - Chain Access Layer
//!
//! Everything that touches the distributed ledger network lives here:
//!
//! - **domain**: wallet key handling, Keccak hashing, EIP-155 legacy
//!   transaction construction and signing. Pure; no I/O.
//! - **ports**: the `ChainRpc` and `RpcConnector` async traits the pipeline
//!   depends on, plus in-memory mocks for tests.
//! - **adapters**: the HTTP JSON-RPC 2.0 client and the failover endpoint
//!   resolver.
//!
//! The split keeps signing testable without a network and lets the pipeline
//! run end-to-end against `MockChainRpc`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::http::{HttpConnector, HttpRpc};
pub use adapters::resolver::{EndpointResolver, ResolvedEndpoint};
pub use domain::tx::{LegacyTransaction, SignedTransaction};
pub use domain::wallet::Wallet;
pub use domain::{keccak256, Address};
pub use ports::{ChainRpc, MockChainRpc, MockConnector, RpcConnector, TxReceipt};
