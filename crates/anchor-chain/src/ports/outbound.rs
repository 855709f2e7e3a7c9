//! # Outbound Ports
//!
//! Traits for the external ledger network (JSON-RPC node access), plus the
//! in-memory mocks the test suites drive.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use anchor_types::AnchorError;

use crate::domain::Address;

/// The network's record of a processed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    /// Hash of the transaction this receipt belongs to.
    pub transaction_hash: String,
    /// On-chain success flag. `false` means the transaction reverted.
    pub status: bool,
    /// Block that included the transaction.
    pub block_number: u64,
    /// Gas consumed.
    pub gas_used: u64,
}

/// JSON-RPC node access - outbound port.
///
/// One instance is bound to one endpoint URL; failover happens above this
/// trait, in the endpoint resolver.
#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// The chain id the node self-reports (`eth_chainId`).
    async fn chain_id(&self) -> Result<u64, AnchorError>;

    /// Current gas price in wei (`eth_gasPrice`).
    async fn gas_price(&self) -> Result<u128, AnchorError>;

    /// Next usable nonce, counting pending transactions
    /// (`eth_getTransactionCount` with the `"pending"` tag).
    async fn pending_nonce(&self, address: Address) -> Result<u64, AnchorError>;

    /// Broadcast signed bytes; returns the transaction hash on acceptance
    /// into the node's pending pool (`eth_sendRawTransaction`).
    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<String, AnchorError>;

    /// Receipt for a transaction, `None` while unprocessed
    /// (`eth_getTransactionReceipt`).
    async fn transaction_receipt(&self, tx_hash: &str) -> Result<Option<TxReceipt>, AnchorError>;

    /// Latest block number (`eth_blockNumber`).
    async fn block_number(&self) -> Result<u64, AnchorError>;
}

/// Client construction - outbound port.
///
/// The resolver opens a short-lived client per candidate URL through this
/// trait, so tests can hand out mocks per URL.
pub trait RpcConnector: Send + Sync {
    /// Build a client bound to `url`.
    fn connect(&self, url: &str) -> Result<Arc<dyn ChainRpc>, AnchorError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Programmable in-memory node for tests.
///
/// Each query can be made to fail; the receipt can be withheld for a number
/// of polls to exercise the confirmation loop.
pub struct MockChainRpc {
    /// Chain id to report.
    pub chain_id: u64,
    /// Gas price (wei) to report.
    pub gas_price_wei: u128,
    /// Pending nonce to report.
    pub nonce: u64,
    /// Hash returned from broadcast.
    pub broadcast_hash: String,
    /// Receipt eventually served, `None` for a permanent timeout.
    pub receipt: Option<TxReceipt>,
    /// Receipt queries that return `None` before `receipt` is served.
    pub receipt_after_polls: u32,
    /// Fail the chain id query.
    pub fail_chain_id: bool,
    /// Fail the gas price query.
    pub fail_gas_price: bool,
    /// Fail the nonce query.
    pub fail_nonce: bool,
    /// Reject broadcasts.
    pub fail_broadcast: bool,

    receipt_polls: AtomicU32,
    broadcasts: Mutex<Vec<Vec<u8>>>,
}

impl MockChainRpc {
    /// A healthy node on the given chain.
    #[must_use]
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            gas_price_wei: 100,
            nonce: 0,
            broadcast_hash: format!("0x{}", "aa".repeat(32)),
            receipt: None,
            receipt_after_polls: 0,
            fail_chain_id: false,
            fail_gas_price: false,
            fail_nonce: false,
            fail_broadcast: false,
            receipt_polls: AtomicU32::new(0),
            broadcasts: Mutex::new(Vec::new()),
        }
    }

    /// Serve this receipt after `after_polls` empty responses.
    #[must_use]
    pub fn with_receipt(mut self, receipt: TxReceipt, after_polls: u32) -> Self {
        self.receipt = Some(receipt);
        self.receipt_after_polls = after_polls;
        self
    }

    /// Report this gas price.
    #[must_use]
    pub fn with_gas_price(mut self, wei: u128) -> Self {
        self.gas_price_wei = wei;
        self
    }

    /// Report this pending nonce.
    #[must_use]
    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    /// Fail every chain id probe.
    #[must_use]
    pub fn failing_chain_id(mut self) -> Self {
        self.fail_chain_id = true;
        self
    }

    /// Fail every gas price query.
    #[must_use]
    pub fn failing_gas_price(mut self) -> Self {
        self.fail_gas_price = true;
        self
    }

    /// Fail every nonce query.
    #[must_use]
    pub fn failing_nonce(mut self) -> Self {
        self.fail_nonce = true;
        self
    }

    /// Reject every broadcast.
    #[must_use]
    pub fn failing_broadcast(mut self) -> Self {
        self.fail_broadcast = true;
        self
    }

    /// Raw transactions this node has accepted, in broadcast order.
    #[must_use]
    pub fn broadcasts(&self) -> Vec<Vec<u8>> {
        self.broadcasts.lock().clone()
    }

    /// How many receipt queries have been answered.
    #[must_use]
    pub fn receipt_polls(&self) -> u32 {
        self.receipt_polls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ChainRpc for MockChainRpc {
    async fn chain_id(&self) -> Result<u64, AnchorError> {
        if self.fail_chain_id {
            return Err(AnchorError::Rpc("mock chain id failure".into()));
        }
        Ok(self.chain_id)
    }

    async fn gas_price(&self) -> Result<u128, AnchorError> {
        if self.fail_gas_price {
            return Err(AnchorError::Rpc("mock gas price failure".into()));
        }
        Ok(self.gas_price_wei)
    }

    async fn pending_nonce(&self, _address: Address) -> Result<u64, AnchorError> {
        if self.fail_nonce {
            return Err(AnchorError::Rpc("mock nonce failure".into()));
        }
        Ok(self.nonce)
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<String, AnchorError> {
        if self.fail_broadcast {
            return Err(AnchorError::Submission("mock broadcast rejection".into()));
        }
        self.broadcasts.lock().push(raw.to_vec());
        Ok(self.broadcast_hash.clone())
    }

    async fn transaction_receipt(&self, _tx_hash: &str) -> Result<Option<TxReceipt>, AnchorError> {
        let poll = self.receipt_polls.fetch_add(1, Ordering::Relaxed);
        if poll < self.receipt_after_polls {
            return Ok(None);
        }
        Ok(self.receipt.clone())
    }

    async fn block_number(&self) -> Result<u64, AnchorError> {
        Ok(self.receipt.as_ref().map_or(100, |r| r.block_number))
    }
}

/// Connector handing out pre-registered mock nodes by URL.
#[derive(Default)]
pub struct MockConnector {
    nodes: HashMap<String, Arc<MockChainRpc>>,
}

impl MockConnector {
    /// Empty connector; every URL is unreachable.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node for a URL.
    #[must_use]
    pub fn with_node(mut self, url: &str, node: Arc<MockChainRpc>) -> Self {
        self.nodes.insert(url.to_string(), node);
        self
    }
}

impl RpcConnector for MockConnector {
    fn connect(&self, url: &str) -> Result<Arc<dyn ChainRpc>, AnchorError> {
        self.nodes
            .get(url)
            .cloned()
            .map(|node| node as Arc<dyn ChainRpc>)
            .ok_or_else(|| AnchorError::Rpc(format!("unreachable endpoint: {url}")))
    }
}
