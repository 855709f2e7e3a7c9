//! # HTTP JSON-RPC Client
//!
//! JSON-RPC 2.0 over HTTP(S) against a single node URL. Quantities travel
//! as `0x`-hex strings per the Ethereum wire convention.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::trace;

use anchor_types::AnchorError;

use crate::domain::{address_hex, Address};
use crate::ports::outbound::{ChainRpc, RpcConnector, TxReceipt};

/// JSON-RPC 2.0 request body.
#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: serde_json::Value,
}

/// JSON-RPC 2.0 response body.
#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// Receipt as returned by `eth_getTransactionReceipt`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReceiptDto {
    transaction_hash: String,
    status: String,
    block_number: String,
    gas_used: String,
}

/// A JSON-RPC client bound to one endpoint URL.
pub struct HttpRpc {
    url: String,
    http: reqwest::Client,
    next_id: AtomicU64,
}

impl HttpRpc {
    /// Build a client with a per-request timeout.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, AnchorError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AnchorError::Rpc(e.to_string()))?;
        Ok(Self {
            url: url.to_string(),
            http,
            next_id: AtomicU64::new(1),
        })
    }

    /// The endpoint URL this client talks to.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, AnchorError> {
        self.call_opt(method, params)
            .await?
            .ok_or_else(|| AnchorError::Rpc(format!("{method}: empty result")))
    }

    /// Like [`HttpRpc::call`], but a `null` result is a valid answer
    /// (`eth_getTransactionReceipt` for unprocessed transactions).
    async fn call_opt<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<Option<T>, AnchorError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        trace!(url = %self.url, method, "rpc call");

        let response: RpcResponse<T> = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AnchorError::Rpc(format!("{method}: {e}")))?
            .json()
            .await
            .map_err(|e| AnchorError::Rpc(format!("{method}: {e}")))?;

        if let Some(err) = response.error {
            return Err(AnchorError::Rpc(format!(
                "{method}: {} (code {})",
                err.message, err.code
            )));
        }
        Ok(response.result)
    }
}

#[async_trait]
impl ChainRpc for HttpRpc {
    async fn chain_id(&self) -> Result<u64, AnchorError> {
        let quantity: String = self.call("eth_chainId", json!([])).await?;
        parse_u64(&quantity)
    }

    async fn gas_price(&self) -> Result<u128, AnchorError> {
        let quantity: String = self.call("eth_gasPrice", json!([])).await?;
        parse_u128(&quantity)
    }

    async fn pending_nonce(&self, address: Address) -> Result<u64, AnchorError> {
        let quantity: String = self
            .call(
                "eth_getTransactionCount",
                json!([address_hex(&address), "pending"]),
            )
            .await?;
        parse_u64(&quantity)
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<String, AnchorError> {
        let raw_hex = format!("0x{}", hex::encode(raw));
        self.call("eth_sendRawTransaction", json!([raw_hex]))
            .await
            .map_err(|e| match e {
                // A rejected broadcast is a submission failure, not transport.
                AnchorError::Rpc(msg) => AnchorError::Submission(msg),
                other => other,
            })
    }

    async fn transaction_receipt(&self, tx_hash: &str) -> Result<Option<TxReceipt>, AnchorError> {
        let dto: Option<ReceiptDto> = self
            .call_opt("eth_getTransactionReceipt", json!([tx_hash]))
            .await?;

        dto.map(|dto| {
            Ok(TxReceipt {
                transaction_hash: dto.transaction_hash,
                status: parse_u64(&dto.status)? == 1,
                block_number: parse_u64(&dto.block_number)?,
                gas_used: parse_u64(&dto.gas_used)?,
            })
        })
        .transpose()
    }

    async fn block_number(&self) -> Result<u64, AnchorError> {
        let quantity: String = self.call("eth_blockNumber", json!([])).await?;
        parse_u64(&quantity)
    }
}

/// Connector producing [`HttpRpc`] clients.
pub struct HttpConnector {
    timeout: Duration,
}

impl HttpConnector {
    /// Connector with a per-request timeout applied to every client.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl RpcConnector for HttpConnector {
    fn connect(&self, url: &str) -> Result<std::sync::Arc<dyn ChainRpc>, AnchorError> {
        Ok(std::sync::Arc::new(HttpRpc::new(url, self.timeout)?))
    }
}

fn parse_u64(quantity: &str) -> Result<u64, AnchorError> {
    u64::from_str_radix(quantity.trim_start_matches("0x"), 16)
        .map_err(|e| AnchorError::Rpc(format!("bad quantity {quantity:?}: {e}")))
}

fn parse_u128(quantity: &str) -> Result<u128, AnchorError> {
    u128::from_str_radix(quantity.trim_start_matches("0x"), 16)
        .map_err(|e| AnchorError::Rpc(format!("bad quantity {quantity:?}: {e}")))
}
