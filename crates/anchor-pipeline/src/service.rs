//! # Anchoring Service
//!
//! The composition root of the pipeline. Owns the resolved endpoint, the
//! signing wallet, the ledger, and the bus; callers get one injected handle
//! and never touch globals.
//!
//! Submission is serialized per wallet: the nonce query, signing, and
//! broadcast happen under one async mutex so concurrent callers cannot
//! observe the same pending nonce and burn a duplicate.

use std::sync::Arc;
use std::time::Duration;

use primitive_types::U256;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use anchor_bus::{EventFilter, LedgerBus, Subscription};
use anchor_chain::{
    ChainRpc, EndpointResolver, LegacyTransaction, ResolvedEndpoint, RpcConnector, Wallet,
};
use anchor_types::{
    AnchorConfig, AnchorError, CivicEventType, EventPayload, LedgerStats, TxRecord,
    GAS_PRICE_MULTIPLIER, RECEIPT_MAX_WAIT_SECS, RECEIPT_POLL_INTERVAL_SECS,
};

use crate::ledger::TxLedger;
use crate::tracker::track_confirmation;

/// What a caller gets back from an anchoring attempt.
///
/// Never an error: issue creation must proceed whether or not the chain is
/// reachable, so every failure mode is folded into a value.
#[derive(Debug, Clone)]
pub struct AnchorOutcome {
    /// True when the transaction was accepted into the node's pending pool.
    /// Confirmation happens later, in the background.
    pub success: bool,
    /// Ledger record for this attempt, when one was appended.
    pub record_id: Option<Uuid>,
    /// Transaction hash, once the broadcast was accepted.
    pub tx_hash: Option<String>,
    /// Explorer link for the hash, when a base URL is configured.
    pub explorer_url: Option<String>,
    /// What went wrong, when something did.
    pub error: Option<String>,
    /// Human-readable trace of the attempt, step by step.
    pub log: Vec<String>,
}

impl AnchorOutcome {
    fn skipped(error: &AnchorError, log: Vec<String>) -> Self {
        Self {
            success: false,
            record_id: None,
            tx_hash: None,
            explorer_url: None,
            error: Some(error.to_string()),
            log,
        }
    }
}

/// The anchoring pipeline behind one handle.
///
/// Construct with [`AnchorService::connect`] and share via `Arc`. All
/// methods take `&self`; internal state is behind its own locks.
pub struct AnchorService {
    config: AnchorConfig,
    wallet: Option<Wallet>,
    endpoint: Option<ResolvedEndpoint>,
    ledger: Arc<TxLedger>,
    bus: Arc<LedgerBus>,
    submit_lock: Mutex<()>,
    receipt_poll_interval: Duration,
    receipt_max_wait: Duration,
}

impl AnchorService {
    /// Build the service: parse the signing key and resolve an endpoint.
    ///
    /// Never fails. A missing or invalid key, or no resolvable endpoint,
    /// leaves the service up in read-only or disconnected form; write
    /// attempts then report why they were skipped.
    pub async fn connect(config: AnchorConfig, connector: Arc<dyn RpcConnector>) -> Self {
        let bus = Arc::new(LedgerBus::new());
        let ledger = Arc::new(TxLedger::new(bus.clone()));

        let wallet = match &config.private_key {
            Some(key) => match Wallet::from_hex_key(key) {
                Ok(wallet) => {
                    info!(address = %wallet.address_hex(), "anchoring wallet loaded");
                    Some(wallet)
                }
                Err(e) => {
                    warn!(error = %e, "signing key rejected; anchoring runs read-only");
                    None
                }
            },
            None => None,
        };

        let endpoint = if config.enabled {
            EndpointResolver::new(connector)
                .resolve(&config.endpoints())
                .await
        } else {
            None
        };

        Self {
            config,
            wallet,
            endpoint,
            ledger,
            bus,
            submit_lock: Mutex::new(()),
            receipt_poll_interval: Duration::from_secs(RECEIPT_POLL_INTERVAL_SECS),
            receipt_max_wait: Duration::from_secs(RECEIPT_MAX_WAIT_SECS),
        }
    }

    /// Override confirmation timing. Tests shrink both to milliseconds.
    #[must_use]
    pub fn with_receipt_timing(mut self, poll_interval: Duration, max_wait: Duration) -> Self {
        self.receipt_poll_interval = poll_interval;
        self.receipt_max_wait = max_wait;
        self
    }

    /// The session ledger.
    #[must_use]
    pub fn ledger(&self) -> &Arc<TxLedger> {
        &self.ledger
    }

    /// Observe ledger mutations matching `filter`.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        self.bus.subscribe(filter)
    }

    /// The endpoint that won resolution, if any did.
    #[must_use]
    pub fn endpoint(&self) -> Option<&ResolvedEndpoint> {
        self.endpoint.as_ref()
    }

    /// True when an endpoint resolved at construction.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Statistics over the session history.
    #[must_use]
    pub fn stats(&self) -> LedgerStats {
        self.ledger.stats()
    }

    /// Current block height of the resolved endpoint (`eth_blockNumber`).
    ///
    /// Part of the read surface, so it works in read-only mode too. `None`
    /// when no endpoint resolved or the query fails.
    pub async fn latest_block(&self) -> Option<u64> {
        let endpoint = self.endpoint.as_ref()?;
        match endpoint.rpc.block_number().await {
            Ok(block) => Some(block),
            Err(e) => {
                warn!(error = %e, "block number query failed");
                None
            }
        }
    }

    /// Anchor a civic event on chain.
    ///
    /// Returns as soon as the broadcast is accepted; a background task then
    /// polls for the receipt and settles the ledger record. The write gates
    /// (disabled, read-only, no key, no resolved endpoint) skip before any
    /// network I/O, without touching the ledger; only failures on the
    /// broadcast path itself are recorded as error entries.
    pub async fn log_civic_event(&self, payload: EventPayload) -> AnchorOutcome {
        let mut log = Vec::new();
        log.push(format!("anchoring {} event", payload.event_type.as_str()));

        let (wallet, endpoint) = match self.writable() {
            Ok(pair) => pair,
            Err(e) => {
                log.push(format!("skipped: {e}"));
                if e.is_configuration() {
                    info!(error = %e, "anchoring skipped");
                } else {
                    warn!(error = %e, "anchoring unavailable");
                }
                return AnchorOutcome::skipped(&e, log);
            }
        };

        // One wallet, one nonce stream: hold the lock across nonce fetch,
        // sign, and broadcast.
        let guard = self.submit_lock.lock().await;
        let submitted = self.submit(wallet, endpoint, &payload, &mut log).await;
        drop(guard);

        match submitted {
            Ok(record) => {
                let tx_hash = record.tx_hash.clone();
                let explorer_url = self.config.explorer_tx_url(&tx_hash);
                if let Some(url) = &explorer_url {
                    log.push(format!("explorer: {url}"));
                }

                tokio::spawn(track_confirmation(
                    self.ledger.clone(),
                    endpoint.rpc.clone(),
                    record.id,
                    tx_hash.clone(),
                    self.receipt_poll_interval,
                    self.receipt_max_wait,
                ));

                AnchorOutcome {
                    success: true,
                    record_id: Some(record.id),
                    tx_hash: Some(tx_hash),
                    explorer_url,
                    error: None,
                    log,
                }
            }
            Err(e) => {
                warn!(error = %e, "broadcast failed");
                log.push(format!("failed: {e}"));
                let record = TxRecord::broadcast_error(payload, e.to_string());
                let record_id = record.id;
                self.ledger.append(record);
                let mut outcome = AnchorOutcome::skipped(&e, log);
                outcome.record_id = Some(record_id);
                outcome
            }
        }
    }

    /// Broadcast a minimal ping event to prove the pipeline end to end.
    pub async fn send_test_transaction(&self) -> AnchorOutcome {
        self.log_civic_event(
            EventPayload::new(CivicEventType::TestPing)
                .with_metadata("purpose", "connectivity check".into()),
        )
        .await
    }

    fn writable(&self) -> Result<(&Wallet, &ResolvedEndpoint), AnchorError> {
        if !self.config.enabled {
            return Err(AnchorError::Disabled);
        }
        if !self.config.event_logging {
            return Err(AnchorError::ReadOnly);
        }
        let wallet = self.wallet.as_ref().ok_or(AnchorError::NoWallet)?;
        let endpoint = self.endpoint.as_ref().ok_or(AnchorError::NoEndpoint {
            expected: self.config.chain_id,
        })?;
        Ok((wallet, endpoint))
    }

    /// Nonce fetch, sign, broadcast. Caller holds the submit lock.
    async fn submit(
        &self,
        wallet: &Wallet,
        endpoint: &ResolvedEndpoint,
        payload: &EventPayload,
        log: &mut Vec<String>,
    ) -> Result<TxRecord, AnchorError> {
        let rpc = &endpoint.rpc;

        let base_gas = rpc.gas_price().await?;
        let (num, den) = GAS_PRICE_MULTIPLIER;
        let gas_price = base_gas * num / den;
        log.push(format!("gas price {base_gas} wei, bumped to {gas_price}"));

        let nonce = rpc.pending_nonce(wallet.address()).await?;
        log.push(format!("pending nonce {nonce}"));

        let tx = LegacyTransaction::anchor(
            wallet.address(),
            nonce,
            U256::from(gas_price),
            payload.encode(),
        );
        let signed = tx.sign(wallet, self.config.chain_id)?;

        let tx_hash = rpc.send_raw_transaction(&signed.raw).await?;
        info!(tx_hash, nonce, gas_price, "transaction broadcast");
        log.push(format!("broadcast accepted: {tx_hash}"));

        let record = TxRecord::pending(tx_hash, payload.clone(), gas_price);
        self.ledger.append(record.clone());
        Ok(record)
    }
}

impl std::fmt::Debug for AnchorService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnchorService")
            .field("connected", &self.is_connected())
            .field("writable", &self.writable().is_ok())
            .field("records", &self.ledger.len())
            .finish_non_exhaustive()
    }
}
