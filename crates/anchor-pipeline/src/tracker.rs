//! # Confirmation Tracker
//!
//! Polls for a transaction receipt on a fixed interval and drives the
//! ledger record to its terminal status. Runs as a background task spawned
//! per broadcast, so submission never waits for inclusion.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

use anchor_chain::{ChainRpc, TxReceipt};
use anchor_types::AnchorError;

use crate::ledger::TxLedger;

/// Poll `rpc` for the receipt of `tx_hash` every `poll_interval`, for at
/// most `max_wait`.
///
/// Transient query errors are logged and retried on the next tick; the
/// node may simply be catching up. `None` means the wait bound elapsed
/// without a receipt.
pub async fn wait_for_receipt(
    rpc: &dyn ChainRpc,
    tx_hash: &str,
    poll_interval: Duration,
    max_wait: Duration,
) -> Option<TxReceipt> {
    let started = Instant::now();
    loop {
        if started.elapsed() >= max_wait {
            return None;
        }
        sleep(poll_interval).await;

        match rpc.transaction_receipt(tx_hash).await {
            Ok(Some(receipt)) => return Some(receipt),
            Ok(None) => debug!(tx_hash, "receipt not yet available"),
            Err(e) => debug!(tx_hash, error = %e, "receipt query failed; will retry"),
        }
    }
}

/// Wait for the receipt of `tx_hash` and settle the ledger record `id`.
///
/// Success flips the record to confirmed with the receipt's block and gas
/// figures. A reverted receipt and an expired wait both flip it to failed;
/// only the message tells them apart.
pub async fn track_confirmation(
    ledger: Arc<TxLedger>,
    rpc: Arc<dyn ChainRpc>,
    id: Uuid,
    tx_hash: String,
    poll_interval: Duration,
    max_wait: Duration,
) {
    match wait_for_receipt(rpc.as_ref(), &tx_hash, poll_interval, max_wait).await {
        Some(receipt) if receipt.status => {
            info!(
                tx_hash,
                block = receipt.block_number,
                gas_used = receipt.gas_used,
                "transaction confirmed"
            );
            ledger.update(id, |r| r.confirm(receipt.block_number, receipt.gas_used, Utc::now()));
        }
        Some(receipt) => {
            warn!(tx_hash, block = receipt.block_number, "transaction reverted");
            let reason = AnchorError::Reverted {
                hash: tx_hash,
                block: receipt.block_number,
            };
            ledger.update(id, |r| r.fail(reason.to_string(), Utc::now()));
        }
        None => {
            warn!(tx_hash, waited = ?max_wait, "gave up waiting for receipt");
            let reason = AnchorError::ReceiptTimeout {
                waited_secs: max_wait.as_secs(),
            };
            ledger.update(id, |r| r.fail(reason.to_string(), Utc::now()));
        }
    }
}
