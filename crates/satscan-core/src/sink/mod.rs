//! Hit sinks: append-only persistence and push notification.
//!
//! Both sinks are best-effort from the scan loop's point of view: their errors
//! are logged and scanning continues.

pub mod notify;
pub mod store;

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Balance, Identity, ProviderId, SecretMaterial, SinkError, UtcDateTime};

pub use notify::{NoopNotifier, NotifyOutcome, PushPlusNotifier};
pub use store::{read_hit_records, NdjsonHitStore};

/// One persisted hit, written as a single JSON line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitRecord {
    pub run_id: Uuid,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<SecretMaterial>,
    pub balance: f64,
    pub balance_sats: u64,
    pub provider: ProviderId,
    pub timestamp: UtcDateTime,
}

impl HitRecord {
    pub fn new(run_id: Uuid, identity: &Identity, provider: ProviderId, balance: Balance) -> Self {
        Self {
            run_id,
            address: identity.address.clone(),
            secret: identity.secret.clone(),
            balance: balance.as_btc(),
            balance_sats: balance.sats(),
            provider,
            timestamp: UtcDateTime::now(),
        }
    }

    /// Human-readable summary used as notification content.
    pub fn summary(&self) -> String {
        format!(
            "Address: {}\nBalance: {} BTC\nProvider: {}\nCaptured: {}",
            self.address,
            Balance::from_sats(self.balance_sats),
            self.provider.host(),
            self.timestamp
        )
    }
}

type SinkFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SinkError>> + Send + 'a>>;

/// Append-only store of hit records.
pub trait HitStore: Send + Sync {
    fn append<'a>(&'a self, record: &'a HitRecord) -> SinkFuture<'a, ()>;
}

/// Fire-and-forget delivery of a hit summary.
pub trait Notifier: Send + Sync {
    fn notify<'a>(&'a self, record: &'a HitRecord) -> SinkFuture<'a, NotifyOutcome>;
}
