//! # Legacy Transaction Construction
//!
//! EIP-155 legacy transactions, RLP-encoded and signed locally. The
//! anchoring pattern is a zero-value transfer to the wallet's own address
//! carrying the encoded event payload as data, so no deployed contract is
//! required.

use primitive_types::{H160, U256};
use rlp::RlpStream;

use anchor_types::{AnchorError, ANCHOR_GAS_LIMIT};

use crate::domain::wallet::Wallet;
use crate::domain::{keccak256, Address};

/// An unsigned legacy transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyTransaction {
    /// Account sequence number.
    pub nonce: u64,
    /// Gas price in wei (already multiplied by the safety factor).
    pub gas_price: U256,
    /// Gas limit.
    pub gas_limit: u64,
    /// Recipient.
    pub to: Address,
    /// Transferred value in wei.
    pub value: U256,
    /// Opaque transaction data.
    pub data: Vec<u8>,
}

/// A signed transaction ready for `eth_sendRawTransaction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    /// RLP-encoded signed transaction bytes.
    pub raw: Vec<u8>,
    /// Keccak-256 of `raw`; the transaction hash the network will report.
    pub hash: [u8; 32],
}

impl SignedTransaction {
    /// `0x`-prefixed hex of the raw bytes, as sent over JSON-RPC.
    #[must_use]
    pub fn raw_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.raw))
    }

    /// `0x`-prefixed hex transaction hash.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        format!("0x{}", hex::encode(self.hash))
    }
}

impl LegacyTransaction {
    /// Build the self-transaction anchoring pattern: zero value, own address
    /// as recipient, payload bytes as data.
    #[must_use]
    pub fn anchor(from: Address, nonce: u64, gas_price: U256, data: Vec<u8>) -> Self {
        Self {
            nonce,
            gas_price,
            gas_limit: ANCHOR_GAS_LIMIT,
            to: from,
            value: U256::zero(),
            data,
        }
    }

    /// EIP-155 signing payload: the 9-item RLP list with
    /// `(chain_id, 0, 0)` in the signature slots.
    #[must_use]
    pub fn sighash(&self, chain_id: u64) -> [u8; 32] {
        let mut stream = RlpStream::new_list(9);
        self.append_body(&mut stream);
        stream.append(&chain_id);
        stream.append(&0u8);
        stream.append(&0u8);
        keccak256(stream.as_raw())
    }

    /// Sign with the wallet's key and produce the broadcastable bytes.
    ///
    /// `v` carries the chain id per EIP-155: `chain_id * 2 + 35 + parity`.
    pub fn sign(&self, wallet: &Wallet, chain_id: u64) -> Result<SignedTransaction, AnchorError> {
        let sighash = self.sighash(chain_id);
        let (signature, recovery_id) = wallet.sign_prehash(&sighash)?;

        let sig_bytes = signature.to_bytes();
        let r = U256::from_big_endian(&sig_bytes[..32]);
        let s = U256::from_big_endian(&sig_bytes[32..]);
        let v = chain_id * 2 + 35 + u64::from(recovery_id.to_byte());

        let mut stream = RlpStream::new_list(9);
        self.append_body(&mut stream);
        stream.append(&v);
        stream.append(&r);
        stream.append(&s);

        let raw = stream.out().to_vec();
        let hash = keccak256(&raw);
        Ok(SignedTransaction { raw, hash })
    }

    /// The six fields shared by the signing payload and the signed encoding.
    fn append_body(&self, stream: &mut RlpStream) {
        stream.append(&self.nonce);
        stream.append(&self.gas_price);
        stream.append(&self.gas_limit);
        stream.append(&H160::from(self.to));
        stream.append(&self.value);
        stream.append(&self.data);
    }
}
