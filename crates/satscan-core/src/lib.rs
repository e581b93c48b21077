//! # satscan core
//!
//! Balance lookup engine that spreads address queries across interchangeable
//! public block explorers, suspends providers that keep failing, and paces
//! itself adaptively.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`registry`] | Provider definitions and response parsers |
//! | [`health`] | Per-provider failure counting and suspension windows |
//! | [`dispatcher`] | Round-robin lookup over eligible providers |
//! | [`pacer`] | Adaptive inter-request delay with jitter |
//! | [`scan`] | The generate → lookup → sink → pace loop |
//! | [`sink`] | Hit persistence and notification |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`clock`] | Clock and sleeper seams |
//! | [`domain`] | Balance, identity and timestamp types |
//! | [`error`] | Error types |
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │    Scan Loop     │──────────────┐
//! └────────┬─────────┘              ▼
//!          │               ┌──────────────────┐
//!          ▼               │ Hit store,       │
//! ┌──────────────────┐     │ Notifier         │
//! │    Dispatcher    │     └──────────────────┘
//! └────────┬─────────┘
//!          │        ┌──────────────────┐
//!          ├───────▶│  Health Tracker  │
//!          │        └──────────────────┘
//!          ▼
//! ┌──────────────────┐
//! │   HTTP Client    │
//! └──────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use satscan_core::*;
//!
//! let tracker = HealthTracker::new(ProviderRegistry::default(), HealthPolicy::default());
//! let mut dispatcher = Dispatcher::new(
//!     tracker,
//!     Arc::new(ReqwestHttpClient::new()),
//!     Arc::new(SystemClock),
//! );
//! match dispatcher.lookup("1BoatSLRHtKNngkdXEeobR76b53LETtpyT").await {
//!     LookupResult::Balance { balance, .. } => println!("{balance} BTC"),
//!     LookupResult::Unavailable(reason) => eprintln!("unavailable: {reason:?}"),
//! }
//! ```

pub mod clock;
pub mod dispatcher;
pub mod domain;
pub mod error;
pub mod health;
pub mod http_client;
pub mod pacer;
pub mod registry;
pub mod scan;
pub mod sink;
pub mod source;

pub use clock::{Clock, ManualClock, Sleeper, SystemClock, TokioSleeper};
pub use dispatcher::{Dispatcher, LookupResult, Unavailable};
pub use domain::{
    Balance, Identity, IdentityGenerator, SecretMaterial, UtcDateTime, WatchlistGenerator,
};
pub use error::{ConfigError, LookupError, ParseError, SinkError};
pub use health::{FailureOutcome, HealthPolicy, HealthSnapshot, HealthTracker, ProviderHealth};
pub use http_client::{
    HttpClient, HttpError, HttpErrorKind, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient,
};
pub use pacer::{AdaptivePacer, PacerConfig};
pub use registry::{BalanceParser, Provider, ProviderRegistry};
pub use scan::{Cooldown, ScanConfig, ScanLoop, ScanOutcome, ScanStats};
pub use sink::{
    read_hit_records, HitRecord, HitStore, NdjsonHitStore, NoopNotifier, Notifier, NotifyOutcome,
    PushPlusNotifier,
};
pub use source::ProviderId;
