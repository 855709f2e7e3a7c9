//! # Endpoint Resolver
//!
//! Failover across an ordered list of candidate endpoints. The first
//! reachable candidate whose self-reported chain id matches its expected id
//! wins (short-circuit, not lowest latency). Exhaustion is a normal
//! "service unavailable" outcome, not an error.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, info, warn};

use anchor_types::{Endpoint, PROBE_TIMEOUT_SECS};

use crate::ports::outbound::{ChainRpc, RpcConnector};

/// An endpoint that answered its probe with the expected chain id, plus the
/// live client bound to it.
#[derive(Clone)]
pub struct ResolvedEndpoint {
    /// The winning candidate.
    pub endpoint: Endpoint,
    /// Client bound to the candidate's URL.
    pub rpc: Arc<dyn ChainRpc>,
}

impl std::fmt::Debug for ResolvedEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedEndpoint")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

/// Probes candidates in order and returns the first identity match.
pub struct EndpointResolver {
    connector: Arc<dyn RpcConnector>,
    probe_timeout: Duration,
}

impl EndpointResolver {
    /// Resolver with the default probe bound.
    #[must_use]
    pub fn new(connector: Arc<dyn RpcConnector>) -> Self {
        Self {
            connector,
            probe_timeout: Duration::from_secs(PROBE_TIMEOUT_SECS),
        }
    }

    /// Override the per-candidate probe bound.
    #[must_use]
    pub fn with_probe_timeout(mut self, probe_timeout: Duration) -> Self {
        self.probe_timeout = probe_timeout;
        self
    }

    /// Find the first candidate whose node reports the expected chain id.
    ///
    /// Candidates that error, time out, or report a different id are logged
    /// and skipped. `None` means no endpoint is usable right now; callers
    /// treat that as "service unavailable", never as a crash.
    pub async fn resolve(&self, candidates: &[Endpoint]) -> Option<ResolvedEndpoint> {
        for candidate in candidates {
            debug!(url = %candidate.url, "probing endpoint");

            let rpc = match self.connector.connect(&candidate.url) {
                Ok(rpc) => rpc,
                Err(e) => {
                    warn!(url = %candidate.url, error = %e, "endpoint client failed to open");
                    continue;
                }
            };

            let reported = match timeout(self.probe_timeout, rpc.chain_id()).await {
                Ok(Ok(id)) => id,
                Ok(Err(e)) => {
                    warn!(url = %candidate.url, error = %e, "chain id probe failed");
                    continue;
                }
                Err(_) => {
                    warn!(
                        url = %candidate.url,
                        timeout_secs = self.probe_timeout.as_secs(),
                        "chain id probe timed out"
                    );
                    continue;
                }
            };

            if reported == candidate.chain_id {
                info!(url = %candidate.url, chain_id = reported, "endpoint resolved");
                return Some(ResolvedEndpoint {
                    endpoint: candidate.clone(),
                    rpc,
                });
            }

            warn!(
                url = %candidate.url,
                expected = candidate.chain_id,
                reported,
                "endpoint reports wrong chain id; skipping"
            );
        }

        warn!(
            candidates = candidates.len(),
            "no endpoint matched; anchoring unavailable"
        );
        None
    }
}
