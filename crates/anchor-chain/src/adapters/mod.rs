//! # Adapters
//!
//! Concrete implementations of the outbound ports: the HTTP JSON-RPC 2.0
//! client and the failover endpoint resolver.

pub mod http;
pub mod resolver;
