//! # Chain Domain
//!
//! Pure transaction-construction and key-handling logic; no network I/O.

pub mod tx;
pub mod wallet;

use sha3::{Digest, Keccak256};

/// 20-byte account address.
pub type Address = [u8; 20];

/// Keccak-256 hash function.
#[must_use]
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// `0x`-prefixed lowercase hex form of an address.
#[must_use]
pub fn address_hex(address: &Address) -> String {
    format!("0x{}", hex::encode(address))
}
