//! The scan loop: generate → lookup → {hit, miss, unavailable} → pace → generate.
//!
//! The loop runs until the shutdown signal flips to `true` (or an optional
//! iteration cap is reached). Every wait races the signal so shutdown is prompt.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::clock::{Sleeper, TokioSleeper};
use crate::dispatcher::{Dispatcher, LookupResult, Unavailable};
use crate::pacer::AdaptivePacer;
use crate::sink::{HitRecord, HitStore, Notifier};
use crate::{Balance, IdentityGenerator, ProviderId};

/// Loop-level knobs that are not part of the pacer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    /// Fixed pause added to the pacer wait when no provider is eligible.
    pub exhaustion_pause: Duration,
    /// Log a warning every this many consecutive unavailable lookups.
    pub failure_report_every: u64,
    pub max_iterations: Option<u64>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            exhaustion_pause: Duration::from_secs(60),
            failure_report_every: 10,
            max_iterations: None,
        }
    }
}

/// Running counters. Observational only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub total: u64,
    pub found: u64,
    pub consecutive_failures: u64,
}

/// What one iteration observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Hit {
        address: String,
        provider: ProviderId,
        balance: Balance,
    },
    Miss {
        address: String,
        provider: ProviderId,
    },
    Unavailable(Unavailable),
}

impl ScanOutcome {
    /// Hits and misses count as success for pacing; every unavailable variant is a failure.
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Unavailable(_))
    }
}

/// How long to wait after an iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cooldown {
    /// Fixed exhaustion pause followed by the pacer's failure wait.
    ///
    /// The fixed pause is never folded into the adaptive delay.
    Exhausted { pause: Duration, paced: Duration },
    /// Pacer-derived wait after stepping the adaptive delay.
    Paced(Duration),
}

impl Cooldown {
    pub fn duration(self) -> Duration {
        match self {
            Self::Exhausted { pause, paced } => pause.saturating_add(paced),
            Self::Paced(duration) => duration,
        }
    }
}

pub struct ScanLoop {
    generator: Box<dyn IdentityGenerator>,
    dispatcher: Dispatcher,
    pacer: AdaptivePacer,
    store: Arc<dyn HitStore>,
    notifier: Arc<dyn Notifier>,
    sleeper: Arc<dyn Sleeper>,
    config: ScanConfig,
    stats: ScanStats,
    run_id: Uuid,
}

impl ScanLoop {
    pub fn new(
        generator: Box<dyn IdentityGenerator>,
        dispatcher: Dispatcher,
        store: Arc<dyn HitStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            generator,
            dispatcher,
            pacer: AdaptivePacer::default(),
            store,
            notifier,
            sleeper: Arc::new(TokioSleeper),
            config: ScanConfig::default(),
            stats: ScanStats::default(),
            run_id: Uuid::new_v4(),
        }
    }

    pub fn with_pacer(mut self, pacer: AdaptivePacer) -> Self {
        self.pacer = pacer;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_config(mut self, config: ScanConfig) -> Self {
        self.config = config;
        self
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    pub fn pacer(&self) -> &AdaptivePacer {
        &self.pacer
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Runs until `shutdown` reads `true` or the iteration cap is reached.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> ScanStats {
        info!(run_id = %self.run_id, "scan loop started");

        loop {
            if *shutdown.borrow() {
                info!("shutdown requested; stopping scan loop");
                break;
            }
            if self
                .config
                .max_iterations
                .is_some_and(|max| self.stats.total >= max)
            {
                info!(total = self.stats.total, "iteration limit reached");
                break;
            }

            let outcome = self.step().await;
            let cooldown = self.cooldown(&outcome);
            self.pause(cooldown.duration(), &mut shutdown).await;
        }

        info!(
            total = self.stats.total,
            found = self.stats.found,
            "scan loop finished"
        );
        self.stats
    }

    /// One generate → lookup → sink pass, without pacing.
    pub async fn step(&mut self) -> ScanOutcome {
        self.stats.total += 1;
        let identity = self.generator.next_identity();

        match self.dispatcher.lookup(&identity.address).await {
            LookupResult::Balance { provider, balance } => {
                self.stats.consecutive_failures = 0;
                info!(
                    "[#{}] address: {} | balance: {} BTC | via {}",
                    self.stats.total,
                    identity.address,
                    balance,
                    provider.host()
                );

                if balance.is_positive() {
                    self.stats.found += 1;
                    let record = HitRecord::new(self.run_id, &identity, provider, balance);
                    self.record_hit(&record).await;
                    ScanOutcome::Hit {
                        address: identity.address,
                        provider,
                        balance,
                    }
                } else {
                    ScanOutcome::Miss {
                        address: identity.address,
                        provider,
                    }
                }
            }
            LookupResult::Unavailable(unavailable) => {
                self.stats.consecutive_failures += 1;
                let streak = self.stats.consecutive_failures;
                if self.config.failure_report_every > 0
                    && streak % self.config.failure_report_every == 0
                {
                    warn!(streak, "consecutive lookups unavailable");
                }
                if unavailable == Unavailable::Exhausted {
                    error!(
                        pause_secs = self.config.exhaustion_pause.as_secs(),
                        "all providers suspended; waiting for recovery"
                    );
                }
                ScanOutcome::Unavailable(unavailable)
            }
        }
    }

    /// Steps the pacer for `outcome`. Exhaustion adds the fixed pause on top.
    pub fn cooldown(&mut self, outcome: &ScanOutcome) -> Cooldown {
        let paced = self.pacer.advance(outcome.is_success());
        match outcome {
            ScanOutcome::Unavailable(Unavailable::Exhausted) => Cooldown::Exhausted {
                pause: self.config.exhaustion_pause,
                paced,
            },
            _ => Cooldown::Paced(paced),
        }
    }

    async fn record_hit(&self, record: &HitRecord) {
        info!(
            address = %record.address,
            balance = %Balance::from_sats(record.balance_sats),
            found = self.stats.found,
            "non-zero balance found"
        );

        if let Err(sink_error) = self.store.append(record).await {
            error!(error = %sink_error, "failed to persist hit record");
        }
        if let Err(sink_error) = self.notifier.notify(record).await {
            warn!(error = %sink_error, "hit notification failed");
        }
    }

    /// Sleeps for `duration` unless the shutdown signal turns `true` first.
    async fn pause(&self, duration: Duration, shutdown: &mut watch::Receiver<bool>) {
        let mut sleep = self.sleeper.sleep(duration);
        loop {
            let changed = tokio::select! {
                _ = &mut sleep => return,
                changed = shutdown.changed() => changed,
            };

            // A dropped sender can never signal again; finish the wait.
            if changed.is_err() {
                sleep.await;
                return;
            }
            if *shutdown.borrow() {
                return;
            }
        }
    }
}
