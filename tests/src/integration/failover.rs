//! # Endpoint Failover
//!
//! Resolution order and chain identity checks, exercised through the
//! service constructor the way production wiring hits them.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use anchor_chain::{EndpointResolver, MockChainRpc, MockConnector};
    use anchor_pipeline::AnchorService;
    use anchor_types::AnchorConfig;

    const KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
    const CHAIN_ID: u64 = 8119;

    fn config(primary: &str, fallbacks: &[&str]) -> AnchorConfig {
        AnchorConfig {
            enabled: true,
            event_logging: true,
            rpc_url: primary.into(),
            fallback_rpc_urls: fallbacks.iter().map(|s| (*s).to_string()).collect(),
            private_key: Some(KEY.into()),
            ..AnchorConfig::default()
        }
    }

    #[tokio::test]
    async fn test_primary_wins_when_healthy() {
        let connector = Arc::new(
            MockConnector::new()
                .with_node("http://primary:8545", Arc::new(MockChainRpc::new(CHAIN_ID)))
                .with_node("http://backup:8545", Arc::new(MockChainRpc::new(CHAIN_ID))),
        );
        let service = AnchorService::connect(
            config("http://primary:8545", &["http://backup:8545"]),
            connector,
        )
        .await;

        assert_eq!(
            service.endpoint().map(|e| e.endpoint.url.as_str()),
            Some("http://primary:8545")
        );
    }

    #[tokio::test]
    async fn test_unreachable_primary_falls_back() {
        // Primary URL is not registered at all: connection refused.
        let connector = Arc::new(
            MockConnector::new()
                .with_node("http://backup:8545", Arc::new(MockChainRpc::new(CHAIN_ID))),
        );
        let service = AnchorService::connect(
            config("http://primary:8545", &["http://backup:8545"]),
            connector,
        )
        .await;

        assert_eq!(
            service.endpoint().map(|e| e.endpoint.url.as_str()),
            Some("http://backup:8545")
        );
    }

    #[tokio::test]
    async fn test_wrong_chain_id_is_skipped() {
        // Primary answers, but it is some other network.
        let connector = Arc::new(
            MockConnector::new()
                .with_node("http://primary:8545", Arc::new(MockChainRpc::new(1)))
                .with_node("http://backup:8545", Arc::new(MockChainRpc::new(CHAIN_ID))),
        );
        let service = AnchorService::connect(
            config("http://primary:8545", &["http://backup:8545"]),
            connector,
        )
        .await;

        assert_eq!(
            service.endpoint().map(|e| e.endpoint.url.as_str()),
            Some("http://backup:8545")
        );
    }

    #[tokio::test]
    async fn test_probe_failure_is_skipped() {
        let connector = Arc::new(
            MockConnector::new()
                .with_node(
                    "http://primary:8545",
                    Arc::new(MockChainRpc::new(CHAIN_ID).failing_chain_id()),
                )
                .with_node("http://backup:8545", Arc::new(MockChainRpc::new(CHAIN_ID))),
        );
        let resolver = EndpointResolver::new(connector)
            .with_probe_timeout(Duration::from_millis(100));

        let resolved = resolver
            .resolve(&config("http://primary:8545", &["http://backup:8545"]).endpoints())
            .await
            .expect("backup resolves");
        assert_eq!(resolved.endpoint.url, "http://backup:8545");
    }

    #[tokio::test]
    async fn test_exhaustion_yields_disconnected_service() {
        crate::init_tracing();
        let connector = Arc::new(
            MockConnector::new()
                .with_node("http://primary:8545", Arc::new(MockChainRpc::new(1)))
                .with_node("http://backup:8545", Arc::new(MockChainRpc::new(2))),
        );
        let service = AnchorService::connect(
            config("http://primary:8545", &["http://backup:8545"]),
            connector,
        )
        .await;

        assert!(!service.is_connected());

        // Writes degrade to skipped outcomes; nothing was attempted, so
        // nothing enters the session history.
        let outcome = service.send_test_transaction().await;
        assert!(!outcome.success);
        assert!(outcome.record_id.is_none());
        assert!(service.ledger().is_empty());
    }

    #[tokio::test]
    async fn test_disabled_config_never_probes() {
        let connector = Arc::new(
            MockConnector::new()
                .with_node("http://primary:8545", Arc::new(MockChainRpc::new(CHAIN_ID))),
        );
        let cfg = AnchorConfig {
            enabled: false,
            ..config("http://primary:8545", &[])
        };
        let service = AnchorService::connect(cfg, connector).await;
        assert!(!service.is_connected());
    }
}
