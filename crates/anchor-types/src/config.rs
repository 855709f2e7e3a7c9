//! Anchoring configuration from environment variables.

use std::env;

use tracing::warn;

use crate::entities::Endpoint;
use crate::DEFAULT_CHAIN_ID;

/// Configuration for the anchoring service.
///
/// Read-only mode is the conservative default: writes require `enabled`
/// *and* `event_logging` *and* a usable signing key.
#[derive(Debug, Clone)]
pub struct AnchorConfig {
    /// Master on/off switch for the whole pipeline.
    pub enabled: bool,

    /// Write switch; without it the service only serves reads.
    pub event_logging: bool,

    /// Primary JSON-RPC URL.
    pub rpc_url: String,

    /// Ordered fallback URLs tried after the primary.
    pub fallback_rpc_urls: Vec<String>,

    /// Chain id every endpoint must self-report.
    pub chain_id: u64,

    /// Hex signing key, no `0x` prefix. Absence forces read-only mode
    /// regardless of the flags above.
    pub private_key: Option<String>,

    /// Explorer base URL for human inspection links.
    pub explorer_url: Option<String>,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            event_logging: false,
            rpc_url: String::new(),
            fallback_rpc_urls: Vec::new(),
            chain_id: DEFAULT_CHAIN_ID,
            private_key: None,
            explorer_url: None,
        }
    }
}

impl AnchorConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `ANCHOR_ENABLED`: master switch (default: false)
    /// - `ANCHOR_EVENT_LOGGING`: allow writes (default: false)
    /// - `ANCHOR_RPC_URL`: primary endpoint URL
    /// - `ANCHOR_FALLBACK_RPC_URLS`: comma-separated ordered fallbacks
    /// - `ANCHOR_CHAIN_ID`: expected chain id (default: 8119)
    /// - `ANCHOR_PRIVATE_KEY`: hex signing key, no `0x` prefix
    /// - `ANCHOR_EXPLORER_URL`: explorer base for inspection links
    #[must_use]
    pub fn from_env() -> Self {
        let chain_id = env::var("ANCHOR_CHAIN_ID")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_CHAIN_ID);

        let private_key = env::var("ANCHOR_PRIVATE_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        if private_key.is_none() {
            warn!("no signing key configured; anchoring runs read-only");
        }

        Self {
            enabled: flag(env::var("ANCHOR_ENABLED").ok()),
            event_logging: flag(env::var("ANCHOR_EVENT_LOGGING").ok()),
            rpc_url: env::var("ANCHOR_RPC_URL").unwrap_or_default(),
            fallback_rpc_urls: env::var("ANCHOR_FALLBACK_RPC_URLS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            chain_id,
            private_key,
            explorer_url: env::var("ANCHOR_EXPLORER_URL")
                .ok()
                .filter(|s| !s.is_empty()),
        }
    }

    /// Primary-then-fallback endpoint candidates, in resolution order.
    #[must_use]
    pub fn endpoints(&self) -> Vec<Endpoint> {
        std::iter::once(&self.rpc_url)
            .chain(self.fallback_rpc_urls.iter())
            .filter(|url| !url.is_empty())
            .map(|url| Endpoint::new(url.clone(), self.chain_id))
            .collect()
    }

    /// Whether configuration alone permits writes. An endpoint still has to
    /// resolve before the first broadcast.
    #[must_use]
    pub fn is_writable(&self) -> bool {
        self.enabled && self.event_logging && self.private_key.is_some()
    }

    /// Explorer link for a transaction hash, when a base URL is configured.
    #[must_use]
    pub fn explorer_tx_url(&self, tx_hash: &str) -> Option<String> {
        self.explorer_url
            .as_ref()
            .map(|base| format!("{}/transaction/{}", base.trim_end_matches('/'), tx_hash))
    }
}

fn flag(value: Option<String>) -> bool {
    value
        .map(|v| {
            let v = v.to_lowercase();
            v == "true" || v == "1"
        })
        .unwrap_or(false)
}
