//! Round-robin balance dispatcher with health-aware failover.
//!
//! Each lookup picks the next provider from the *currently eligible* set, so a
//! suspended provider is skipped without the caller knowing about it. The cursor
//! keeps advancing across calls regardless of how the eligible set changes size.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::clock::Clock;
use crate::health::{FailureOutcome, HealthTracker};
use crate::http_client::{HttpClient, HttpRequest, DEFAULT_TIMEOUT};
use crate::registry::Provider;
use crate::{Balance, LookupError, ProviderId};

/// Why a lookup produced no balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unavailable {
    /// No provider was eligible at lookup time.
    Exhausted,
    /// The selected provider's call failed.
    CallFailed {
        provider: ProviderId,
        error: LookupError,
    },
}

/// Outcome of a single dispatched lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResult {
    Balance {
        provider: ProviderId,
        balance: Balance,
    },
    Unavailable(Unavailable),
}

impl LookupResult {
    pub fn balance(&self) -> Option<Balance> {
        match self {
            Self::Balance { balance, .. } => Some(*balance),
            Self::Unavailable(_) => None,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Unavailable(Unavailable::Exhausted))
    }
}

/// Issues lookups against eligible providers and feeds outcomes back into health.
pub struct Dispatcher {
    tracker: HealthTracker,
    http_client: Arc<dyn HttpClient>,
    clock: Arc<dyn Clock>,
    cursor: usize,
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(
        tracker: HealthTracker,
        http_client: Arc<dyn HttpClient>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tracker,
            http_client,
            clock,
            cursor: 0,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn tracker(&self) -> &HealthTracker {
        &self.tracker
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Number of lookups that reached provider selection.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub async fn lookup(&mut self, address: &str) -> LookupResult {
        let Some(provider) = self.select_provider() else {
            return LookupResult::Unavailable(Unavailable::Exhausted);
        };

        match self.query(&provider, address).await {
            Ok(balance) => {
                self.tracker.record_success(provider.id());
                LookupResult::Balance {
                    provider: provider.id(),
                    balance,
                }
            }
            Err(lookup_error) => {
                self.record_failure(provider.id(), &lookup_error);
                LookupResult::Unavailable(Unavailable::CallFailed {
                    provider: provider.id(),
                    error: lookup_error,
                })
            }
        }
    }

    fn select_provider(&mut self) -> Option<Provider> {
        let eligible = self.tracker.eligible(self.clock.now());
        if eligible.is_empty() {
            return None;
        }

        let provider = eligible[self.cursor % eligible.len()].clone();
        self.cursor = self.cursor.wrapping_add(1);
        Some(provider)
    }

    async fn query(&self, provider: &Provider, address: &str) -> Result<Balance, LookupError> {
        let request = HttpRequest::get(provider.url_for(address)).with_timeout(self.timeout);
        debug!(provider = %provider.id(), url = %request.url, "dispatching balance lookup");

        let response = self.http_client.execute(request).await?;
        if !response.is_success() {
            return Err(LookupError::Status(response.status));
        }

        Ok(provider.parse_balance(&response.body)?)
    }

    fn record_failure(&mut self, provider: ProviderId, lookup_error: &LookupError) {
        let now = self.clock.now();
        match self.tracker.record_failure(provider, now) {
            Some(FailureOutcome::Counted { failures }) => {
                warn!(%provider, failures, error = %lookup_error, "provider lookup failed");
            }
            Some(FailureOutcome::Blocked { failures, .. }) => {
                let minutes = self.tracker.policy().block_duration.as_secs() / 60;
                warn!(%provider, failures, error = %lookup_error, "provider lookup failed");
                error!(%provider, minutes, "provider suspended");
            }
            None => {}
        }
    }
}
