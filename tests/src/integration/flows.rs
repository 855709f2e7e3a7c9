//! # Pipeline Flows
//!
//! End-to-end choreography through the public surface only: configure,
//! connect, anchor an event, and watch the ledger settle. The chain is a
//! programmable mock node; everything above it is the real pipeline.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
    use primitive_types::U256;
    use sha3::{Digest, Keccak256};

    use anchor_chain::{LegacyTransaction, MockChainRpc, MockConnector, TxReceipt, Wallet};
    use anchor_pipeline::AnchorService;
    use anchor_types::{AnchorConfig, CivicEventType, EventPayload, TxStatus};

    const KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
    const URL: &str = "http://node:8545";
    const CHAIN_ID: u64 = 8119;

    fn config() -> AnchorConfig {
        AnchorConfig {
            enabled: true,
            event_logging: true,
            rpc_url: URL.into(),
            private_key: Some(KEY.into()),
            explorer_url: Some("https://scan.civic.example".into()),
            ..AnchorConfig::default()
        }
    }

    fn receipt(status: bool) -> TxReceipt {
        TxReceipt {
            transaction_hash: format!("0x{}", "aa".repeat(32)),
            status,
            block_number: 42,
            gas_used: 21_000,
        }
    }

    fn grievance_payload() -> EventPayload {
        EventPayload::new(CivicEventType::GrievanceSubmitted)
            .with_subject("grievance_id", "GRV-1042")
            .with_subject("ward", "7")
            .with_metadata("category", "streetlight".into())
    }

    async fn connect(node: Arc<MockChainRpc>) -> AnchorService {
        let connector = Arc::new(MockConnector::new().with_node(URL, node));
        AnchorService::connect(config(), connector)
            .await
            .with_receipt_timing(Duration::from_millis(5), Duration::from_millis(250))
    }

    async fn settle(service: &AnchorService, status: TxStatus) {
        for _ in 0..200 {
            if !service.ledger().by_status(status).is_empty() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("ledger never reached {status:?}");
    }

    #[tokio::test]
    async fn test_event_anchored_and_confirmed() {
        crate::init_tracing();
        let node = Arc::new(
            MockChainRpc::new(CHAIN_ID)
                .with_gas_price(100)
                .with_nonce(5)
                .with_receipt(receipt(true), 2),
        );
        let service = connect(node.clone()).await;
        assert!(service.is_connected());

        let outcome = service.log_civic_event(grievance_payload()).await;
        assert!(outcome.success);
        assert!(outcome.tx_hash.is_some());
        assert!(outcome
            .explorer_url
            .as_deref()
            .unwrap()
            .starts_with("https://scan.civic.example/transaction/0x"));

        settle(&service, TxStatus::Confirmed).await;
        let record = service.ledger().all().remove(0);
        assert_eq!(record.status, TxStatus::Confirmed);
        assert_eq!(record.block_number, Some(42));
        assert_eq!(record.gas_used, Some(21_000));
        assert_eq!(record.gas_price_wei, 120);
        assert_eq!(record.gas_cost_wei, 21_000 * 120);
        assert!(record.duration_secs > 0.0);

        let stats = service.stats();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.confirmed, 1);
        assert!((stats.success_rate - 100.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_receipt_timeout_fails_without_block() {
        // Node never serves a receipt.
        let node = Arc::new(MockChainRpc::new(CHAIN_ID));
        let service = connect(node).await;

        let outcome = service.log_civic_event(grievance_payload()).await;
        assert!(outcome.success, "broadcast itself succeeds");

        settle(&service, TxStatus::Failed).await;
        let record = service.ledger().all().remove(0);
        assert_eq!(record.block_number, None);
        assert_eq!(record.gas_used, None);
        assert!(record.error.as_deref().unwrap().starts_with("no receipt"));
    }

    #[tokio::test]
    async fn test_reverted_transaction_fails_with_reason() {
        let node = Arc::new(MockChainRpc::new(CHAIN_ID).with_receipt(receipt(false), 0));
        let service = connect(node).await;

        service.log_civic_event(grievance_payload()).await;
        settle(&service, TxStatus::Failed).await;

        let record = service.ledger().all().remove(0);
        let reason = record.error.as_deref().unwrap();
        assert!(reason.contains("reverted in block 42"), "got: {reason}");
    }

    #[tokio::test]
    async fn test_nonce_failure_leaves_error_record() {
        let node = Arc::new(MockChainRpc::new(CHAIN_ID).failing_nonce());
        let service = connect(node).await;

        let outcome = service.log_civic_event(grievance_payload()).await;
        assert!(!outcome.success);
        assert!(outcome.tx_hash.is_none());

        let record = service.ledger().all().remove(0);
        assert_eq!(record.status, TxStatus::Error);
        assert!(record.tx_hash.is_empty());
        assert_eq!(service.stats().errored, 1);
    }

    #[tokio::test]
    async fn test_broadcast_bytes_carry_payload_and_recover_signer() {
        let payload = grievance_payload();
        let node = Arc::new(
            MockChainRpc::new(CHAIN_ID)
                .with_nonce(5)
                .with_gas_price(100)
                .with_receipt(receipt(true), 0),
        );
        let service = connect(node.clone()).await;

        service.log_civic_event(payload.clone()).await;

        let broadcasts = node.broadcasts();
        assert_eq!(broadcasts.len(), 1);
        let raw = &broadcasts[0];

        // Decode the nine-item EIP-155 legacy body.
        let decoded = rlp::Rlp::new(raw);
        assert_eq!(decoded.item_count().unwrap(), 9);
        let nonce: u64 = decoded.val_at(0).unwrap();
        let gas_price: U256 = decoded.val_at(1).unwrap();
        let to: Vec<u8> = decoded.val_at(3).unwrap();
        let value: U256 = decoded.val_at(4).unwrap();
        let data: Vec<u8> = decoded.val_at(5).unwrap();
        let v: u64 = decoded.val_at(6).unwrap();
        let r: U256 = decoded.val_at(7).unwrap();
        let s: U256 = decoded.val_at(8).unwrap();

        let wallet = Wallet::from_hex_key(KEY).unwrap();
        assert_eq!(nonce, 5);
        assert_eq!(gas_price, U256::from(120));
        assert_eq!(to, wallet.address().to_vec(), "self-transaction");
        assert_eq!(value, U256::zero(), "value-free anchor");
        assert_eq!(data, payload.encode(), "payload rides in the data field");
        assert!(v == CHAIN_ID * 2 + 35 || v == CHAIN_ID * 2 + 36);

        // Recover the signer from the signature.
        let tx = LegacyTransaction::anchor(wallet.address(), nonce, gas_price, data);
        let sighash = tx.sighash(CHAIN_ID);

        let mut sig_bytes = [0u8; 64];
        r.to_big_endian(&mut sig_bytes[..32]);
        s.to_big_endian(&mut sig_bytes[32..]);
        let signature = Signature::from_slice(&sig_bytes).unwrap();
        let recovery = RecoveryId::try_from((v - CHAIN_ID * 2 - 35) as u8).unwrap();
        let verifying =
            VerifyingKey::recover_from_prehash(&sighash, &signature, recovery).unwrap();

        let encoded = verifying.to_encoded_point(false);
        let digest = Keccak256::digest(&encoded.as_bytes()[1..]);
        assert_eq!(digest[12..], wallet.address()[..]);
    }

    #[tokio::test]
    async fn test_payload_encoding_is_deterministic_on_the_wire() {
        let payload = grievance_payload();
        let node = Arc::new(MockChainRpc::new(CHAIN_ID).with_nonce(5));
        let service = connect(node.clone()).await;

        service.log_civic_event(payload.clone()).await;
        let node2 = Arc::new(MockChainRpc::new(CHAIN_ID).with_nonce(5));
        let service2 = connect(node2.clone()).await;
        service2.log_civic_event(payload).await;

        // Same payload, same nonce, same key: byte-identical broadcasts.
        assert_eq!(node.broadcasts(), node2.broadcasts());
    }

    #[tokio::test]
    async fn test_retry_appends_a_fresh_record() {
        let node = Arc::new(MockChainRpc::new(CHAIN_ID).with_receipt(receipt(true), 0));
        let service = connect(node).await;

        let first = service.log_civic_event(grievance_payload()).await;
        let second = service.log_civic_event(grievance_payload()).await;

        assert_ne!(first.record_id, second.record_id);
        assert_eq!(service.ledger().len(), 2);
    }
}
