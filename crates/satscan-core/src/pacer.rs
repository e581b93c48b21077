//! Adaptive inter-request delay with jitter.

use std::time::Duration;

use crate::clock::Sleeper;
use crate::ConfigError;

/// Bounds and step sizes for the adaptive delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacerConfig {
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Added to the delay after a failed cycle.
    pub failure_step: Duration,
    /// Removed from the delay after a successful cycle.
    pub success_step: Duration,
    /// Upper bound of the uniform jitter added to every wait.
    pub max_jitter: Duration,
}

impl Default for PacerConfig {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(1_500),
            max_delay: Duration::from_millis(4_000),
            failure_step: Duration::from_millis(800),
            success_step: Duration::from_millis(400),
            max_jitter: Duration::from_millis(1_500),
        }
    }
}

impl PacerConfig {
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.base_delay > self.max_delay {
            return Err(ConfigError::InvalidDelays {
                base_ms: duration_ms(self.base_delay),
                max_ms: duration_ms(self.max_delay),
            });
        }
        Ok(self)
    }
}

/// Single process-wide delay, kept within `[base_delay, max_delay]`.
#[derive(Debug, Clone)]
pub struct AdaptivePacer {
    config: PacerConfig,
    current_delay: Duration,
}

impl Default for AdaptivePacer {
    fn default() -> Self {
        Self {
            config: PacerConfig::default(),
            current_delay: PacerConfig::default().base_delay,
        }
    }
}

impl AdaptivePacer {
    pub fn new(config: PacerConfig) -> Result<Self, ConfigError> {
        let config = config.validate()?;
        Ok(Self {
            config,
            current_delay: config.base_delay,
        })
    }

    pub fn config(&self) -> PacerConfig {
        self.config
    }

    pub fn current_delay(&self) -> Duration {
        self.current_delay
    }

    /// Steps the delay for the cycle outcome and returns the jittered wait.
    pub fn advance(&mut self, success: bool) -> Duration {
        self.current_delay = if success {
            self.current_delay
                .saturating_sub(self.config.success_step)
                .max(self.config.base_delay)
        } else {
            self.current_delay
                .saturating_add(self.config.failure_step)
                .min(self.config.max_delay)
        };

        self.current_delay + self.jitter()
    }

    pub async fn wait(&mut self, success: bool, sleeper: &dyn Sleeper) -> Duration {
        let delay = self.advance(success);
        sleeper.sleep(delay).await;
        delay
    }

    fn jitter(&self) -> Duration {
        let max_ms = duration_ms(self.config.max_jitter);
        Duration::from_millis(fastrand::u64(0..=max_ms))
    }
}

fn duration_ms(duration: Duration) -> u64 {
    duration.as_millis().min(u128::from(u64::MAX)) as u64
}
