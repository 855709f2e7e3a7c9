//! # Wallet
//!
//! Account address plus the private signing key. Owned exclusively by the
//! submitter; the key is never copied into ledger records, never exposed to
//! observers, and never transmitted.

use std::fmt;

use k256::ecdsa::{RecoveryId, Signature, SigningKey};

use anchor_types::AnchorError;

use crate::domain::{address_hex, keccak256, Address};

/// A single signing account.
pub struct Wallet {
    address: Address,
    signing_key: SigningKey,
}

impl Wallet {
    /// Build a wallet from a hex-encoded private key.
    ///
    /// Accepts the configured no-prefix form; a stray `0x` prefix is
    /// tolerated.
    pub fn from_hex_key(key_hex: &str) -> Result<Self, AnchorError> {
        let trimmed = key_hex.trim().trim_start_matches("0x");
        let bytes =
            hex::decode(trimmed).map_err(|e| AnchorError::InvalidKey(e.to_string()))?;
        let signing_key =
            SigningKey::from_slice(&bytes).map_err(|e| AnchorError::InvalidKey(e.to_string()))?;
        let address = derive_address(&signing_key);
        Ok(Self {
            address,
            signing_key,
        })
    }

    /// Generate a throwaway wallet for test fixtures.
    #[cfg(test)]
    pub(crate) fn random() -> Self {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        let address = derive_address(&signing_key);
        Self {
            address,
            signing_key,
        }
    }

    /// The account address.
    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    /// `0x`-prefixed hex address, as used in RPC parameters.
    #[must_use]
    pub fn address_hex(&self) -> String {
        address_hex(&self.address)
    }

    /// Sign a 32-byte digest, returning the signature and recovery id.
    pub fn sign_prehash(&self, digest: &[u8; 32]) -> Result<(Signature, RecoveryId), AnchorError> {
        self.signing_key
            .sign_prehash_recoverable(digest)
            .map_err(|e| AnchorError::Encoding(format!("signing failed: {e}")))
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Key material stays out of logs.
        f.debug_struct("Wallet")
            .field("address", &self.address_hex())
            .field("signing_key", &"<redacted>")
            .finish()
    }
}

/// Derive the account address: Keccak-256 of the uncompressed public key
/// (without the 0x04 prefix), last 20 bytes.
fn derive_address(signing_key: &SigningKey) -> Address {
    let pubkey = signing_key.verifying_key().to_encoded_point(false);
    let hash = keccak256(&pubkey.as_bytes()[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}
