//! # Ledger Observers
//!
//! Fan-out from the service's ledger bus: every mutation reaches every
//! live subscriber, filters narrow what each one sees, and one misbehaving
//! subscriber never starves the rest.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::time::timeout;

    use anchor_bus::{EventFilter, EventKind};
    use anchor_chain::{MockChainRpc, MockConnector, TxReceipt};
    use anchor_pipeline::AnchorService;
    use anchor_types::{AnchorConfig, TxStatus};

    const KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
    const URL: &str = "http://node:8545";
    const RECV_WAIT: Duration = Duration::from_secs(2);

    async fn connected_service(node: MockChainRpc) -> AnchorService {
        let config = AnchorConfig {
            enabled: true,
            event_logging: true,
            rpc_url: URL.into(),
            private_key: Some(KEY.into()),
            ..AnchorConfig::default()
        };
        let connector = Arc::new(MockConnector::new().with_node(URL, Arc::new(node)));
        AnchorService::connect(config, connector)
            .await
            .with_receipt_timing(Duration::from_millis(5), Duration::from_millis(250))
    }

    fn confirming_node() -> MockChainRpc {
        MockChainRpc::new(8119).with_receipt(
            TxReceipt {
                transaction_hash: format!("0x{}", "aa".repeat(32)),
                status: true,
                block_number: 42,
                gas_used: 21_000,
            },
            1,
        )
    }

    #[tokio::test]
    async fn test_observer_sees_pending_then_confirmed() {
        let service = connected_service(confirming_node()).await;
        let mut sub = service.subscribe(EventFilter::all());

        service.send_test_transaction().await;

        let appended = timeout(RECV_WAIT, sub.recv()).await.unwrap().unwrap();
        assert_eq!(appended.kind(), EventKind::Appended);
        assert_eq!(appended.status(), TxStatus::Pending);

        let updated = timeout(RECV_WAIT, sub.recv()).await.unwrap().unwrap();
        assert_eq!(updated.kind(), EventKind::Updated);
        assert_eq!(updated.status(), TxStatus::Confirmed);
        assert_eq!(updated.record().block_number, Some(42));
    }

    #[tokio::test]
    async fn test_status_filter_skips_intermediate_states() {
        let service = connected_service(confirming_node()).await;
        let mut sub = service.subscribe(EventFilter::statuses(vec![TxStatus::Confirmed]));

        service.send_test_transaction().await;

        // The pending append is filtered out; first delivery is terminal.
        let event = timeout(RECV_WAIT, sub.recv()).await.unwrap().unwrap();
        assert_eq!(event.status(), TxStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_every_subscriber_gets_every_event() {
        let service = connected_service(confirming_node()).await;
        let mut subs: Vec<_> = (0..3)
            .map(|_| service.subscribe(EventFilter::all()))
            .collect();

        service.send_test_transaction().await;

        for sub in &mut subs {
            let first = timeout(RECV_WAIT, sub.recv()).await.unwrap().unwrap();
            assert_eq!(first.kind(), EventKind::Appended);
        }
    }

    #[tokio::test]
    async fn test_dropped_subscriber_does_not_stall_the_rest() {
        let service = connected_service(confirming_node()).await;
        let dead = service.subscribe(EventFilter::all());
        let mut alive = service.subscribe(EventFilter::all());
        drop(dead);

        service.send_test_transaction().await;

        let event = timeout(RECV_WAIT, alive.recv()).await.unwrap().unwrap();
        assert_eq!(event.kind(), EventKind::Appended);
    }

    #[tokio::test]
    async fn test_slow_subscriber_never_blocks_submission() {
        let service = connected_service(confirming_node()).await;
        // Subscribed but never draining.
        let _lazy = service.subscribe(EventFilter::all());

        for _ in 0..5 {
            let outcome = service.send_test_transaction().await;
            assert!(outcome.success);
        }
        assert_eq!(service.ledger().len(), 5);
    }
}
