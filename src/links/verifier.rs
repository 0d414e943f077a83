//! Existence verification of product detail pages.
//!
//! Each identifier is checked with a HEAD probe, escalating to GET when HEAD
//! reports an error status or fails inconclusively. Identifiers are probed
//! concurrently up to `max_concurrency`, optionally under a request-rate
//! quota towards the product host. Verification itself never fails: every
//! error becomes `false` for that identifier.

use std::collections::{HashMap, HashSet};
use std::num::NonZeroU32;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{stream, FutureExt, StreamExt};
use governor::{Quota, RateLimiter};

use super::probe::{HttpProbe, PageProbe, ProbeError};
use super::site::ProductSite;
use crate::core::config::VerificationConfig;

type DirectRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Identifier → page exists. Lookups of unknown identifiers return `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationMap {
    entries: HashMap<String, bool>,
}

impl VerificationMap {
    pub fn is_verified(&self, identifier: &str) -> bool {
        self.entries.get(identifier).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn verified_count(&self) -> usize {
        self.entries.values().filter(|exists| **exists).count()
    }
}

impl FromIterator<(String, bool)> for VerificationMap {
    fn from_iter<I: IntoIterator<Item = (String, bool)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[derive(Clone)]
pub struct LinkVerifier {
    probe: Arc<dyn PageProbe>,
    max_concurrency: usize,
    probe_timeout: Duration,
    limiter: Option<Arc<DirectRateLimiter>>,
}

impl LinkVerifier {
    pub fn new(probe: Arc<dyn PageProbe>, max_concurrency: usize, probe_timeout: Duration) -> Self {
        Self {
            probe,
            max_concurrency: max_concurrency.max(1),
            probe_timeout,
            limiter: None,
        }
    }

    pub fn from_config(config: &VerificationConfig) -> Result<Self, ProbeError> {
        let probe = Arc::new(HttpProbe::new(config)?);
        // Hard ceiling per probe on top of the client's own timeouts.
        let probe_timeout = config.connect_timeout() + config.timeout();
        let verifier = Self::new(probe, config.max_concurrency, probe_timeout);
        Ok(match config.requests_per_second.and_then(NonZeroU32::new) {
            Some(rate) => verifier.with_rate_limit(rate),
            None => verifier,
        })
    }

    pub fn with_rate_limit(mut self, requests_per_second: NonZeroU32) -> Self {
        let quota = Quota::per_second(requests_per_second);
        self.limiter = Some(Arc::new(RateLimiter::direct(quota)));
        self
    }

    pub async fn verify(&self, site: &ProductSite, identifiers: &HashSet<String>) -> VerificationMap {
        if identifiers.is_empty() {
            return VerificationMap::default();
        }

        tracing::info!(
            count = identifiers.len(),
            concurrency = self.max_concurrency,
            host = site.host(),
            "Verifying product pages"
        );

        let results: Vec<(String, bool)> = stream::iter(identifiers.iter().cloned())
            .map(|identifier| async move {
                let url = site.product_url(&identifier);
                let exists = AssertUnwindSafe(self.check(&identifier, &url))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|_| {
                        tracing::warn!(identifier = %identifier, "Product page probe panicked");
                        false
                    });
                (identifier, exists)
            })
            .buffer_unordered(self.max_concurrency)
            .collect()
            .await;

        let map: VerificationMap = results.into_iter().collect();
        tracing::info!(
            verified = map.verified_count(),
            total = map.len(),
            "Product page verification finished"
        );
        map
    }

    async fn check(&self, identifier: &str, url: &str) -> bool {
        match self.run_probe(url, false).await {
            Ok(status) if status < 400 => {
                tracing::debug!(identifier, status, "HEAD verified product page");
                return true;
            }
            Ok(status) => {
                tracing::debug!(identifier, status, "HEAD rejected, retrying with GET");
            }
            Err(err) if err.is_terminal() => {
                tracing::debug!(identifier, error = %err, "Product page unreachable");
                return false;
            }
            Err(err) => {
                tracing::debug!(identifier, error = %err, "HEAD inconclusive, retrying with GET");
            }
        }

        match self.run_probe(url, true).await {
            Ok(status) => {
                tracing::debug!(identifier, status, "GET checked product page");
                status < 400
            }
            Err(err) => {
                tracing::debug!(identifier, error = %err, "GET failed for product page");
                false
            }
        }
    }

    async fn run_probe(&self, url: &str, full_fetch: bool) -> Result<u16, ProbeError> {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }

        let request = async {
            if full_fetch {
                self.probe.get(url).await
            } else {
                self.probe.head(url).await
            }
        };

        tokio::time::timeout(self.probe_timeout, request)
            .await
            .unwrap_or(Err(ProbeError::Timeout))
    }
}
