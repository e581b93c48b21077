use std::time::{Duration, Instant};

use crate::registry::{Provider, ProviderRegistry};
use crate::ProviderId;

/// Failure threshold and suspension window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthPolicy {
    pub fail_limit: u32,
    pub block_duration: Duration,
}

impl HealthPolicy {
    pub const FAIL_LIMIT: u32 = 8;
    pub const BLOCK_DURATION: Duration = Duration::from_secs(10 * 60);
}

impl Default for HealthPolicy {
    fn default() -> Self {
        Self {
            fail_limit: Self::FAIL_LIMIT,
            block_duration: Self::BLOCK_DURATION,
        }
    }
}

/// Mutable health record owned one-to-one with a provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProviderHealth {
    consecutive_failures: u32,
    blocked_until: Option<Instant>,
}

impl ProviderHealth {
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn blocked_until(&self) -> Option<Instant> {
        self.blocked_until
    }

    /// Eligible once `now` has reached the stored deadline; nothing unblocks explicitly.
    pub fn is_eligible(&self, now: Instant) -> bool {
        self.blocked_until.map_or(true, |until| until <= now)
    }
}

/// Result of recording a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOutcome {
    Counted { failures: u32 },
    Blocked { failures: u32, until: Instant },
}

/// Point-in-time view of a provider's health, for progress output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthSnapshot {
    pub id: ProviderId,
    pub consecutive_failures: u32,
    pub eligible: bool,
    pub blocked_for: Option<Duration>,
}

impl HealthSnapshot {
    pub fn status_label(self) -> &'static str {
        if !self.eligible {
            "blocked"
        } else if self.consecutive_failures > 0 {
            "degraded"
        } else {
            "healthy"
        }
    }
}

#[derive(Debug, Clone)]
struct TrackedProvider {
    provider: Provider,
    health: ProviderHealth,
}

/// Owns every provider's health record and decides eligibility.
#[derive(Debug, Clone)]
pub struct HealthTracker {
    policy: HealthPolicy,
    tracked: Vec<TrackedProvider>,
}

impl HealthTracker {
    pub fn new(registry: ProviderRegistry, policy: HealthPolicy) -> Self {
        Self {
            policy,
            tracked: registry
                .providers()
                .iter()
                .cloned()
                .map(|provider| TrackedProvider {
                    provider,
                    health: ProviderHealth::default(),
                })
                .collect(),
        }
    }

    pub fn policy(&self) -> HealthPolicy {
        self.policy
    }

    /// Providers whose suspension window has passed, in registry order.
    pub fn eligible(&self, now: Instant) -> Vec<&Provider> {
        self.tracked
            .iter()
            .filter(|entry| entry.health.is_eligible(now))
            .map(|entry| &entry.provider)
            .collect()
    }

    pub fn health(&self, id: ProviderId) -> Option<ProviderHealth> {
        self.entry(id).map(|entry| entry.health)
    }

    /// Resets the failure counter. An active suspension keeps running.
    pub fn record_success(&mut self, id: ProviderId) {
        if let Some(entry) = self.entry_mut(id) {
            entry.health.consecutive_failures = 0;
        }
    }

    /// Counts a failure and suspends the provider once the counter reaches the limit.
    ///
    /// The counter is left at or above the limit, so a provider re-admitted after
    /// its window is suspended again by its next failure.
    pub fn record_failure(&mut self, id: ProviderId, now: Instant) -> Option<FailureOutcome> {
        let policy = self.policy;
        let entry = self.entry_mut(id)?;
        let health = &mut entry.health;
        health.consecutive_failures = health.consecutive_failures.saturating_add(1);

        if health.consecutive_failures >= policy.fail_limit {
            let until = now + policy.block_duration;
            health.blocked_until = Some(until);
            Some(FailureOutcome::Blocked {
                failures: health.consecutive_failures,
                until,
            })
        } else {
            Some(FailureOutcome::Counted {
                failures: health.consecutive_failures,
            })
        }
    }

    pub fn snapshot(&self, now: Instant) -> Vec<HealthSnapshot> {
        self.tracked
            .iter()
            .map(|entry| HealthSnapshot {
                id: entry.provider.id(),
                consecutive_failures: entry.health.consecutive_failures,
                eligible: entry.health.is_eligible(now),
                blocked_for: entry
                    .health
                    .blocked_until
                    .and_then(|until| until.checked_duration_since(now))
                    .filter(|remaining| !remaining.is_zero()),
            })
            .collect()
    }

    fn entry(&self, id: ProviderId) -> Option<&TrackedProvider> {
        self.tracked.iter().find(|entry| entry.provider.id() == id)
    }

    fn entry_mut(&mut self, id: ProviderId) -> Option<&mut TrackedProvider> {
        self.tracked
            .iter_mut()
            .find(|entry| entry.provider.id() == id)
    }
}
