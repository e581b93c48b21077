use thiserror::Error;

use crate::http_client::HttpError;
use crate::ProviderId;

/// Startup configuration errors. These are the only fatal errors in the crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("provider registry must contain at least one provider")]
    EmptyRegistry,
    #[error("provider '{id}' is registered more than once")]
    DuplicateProvider { id: ProviderId },
    #[error("invalid provider '{value}', expected one of mempool, blockstream, blockchain_info")]
    InvalidProvider { value: String },
    #[error("base delay {base_ms}ms must not exceed max delay {max_ms}ms")]
    InvalidDelays { base_ms: u64, max_ms: u64 },
    #[error("watchlist contains no addresses")]
    EmptyWatchlist,
    #[error("failed to read watchlist '{path}': {message}")]
    Watchlist { path: String, message: String },
    #[error("invalid RFC3339 timestamp '{value}': {message}")]
    InvalidTimestamp { value: String, message: String },
}

/// Failure to turn a provider response body into a balance.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("response is not valid JSON: {message}")]
    InvalidJson { message: String },
    #[error("response is missing integer field '{field}'")]
    MissingField { field: &'static str },
    #[error("spent sum {spent} exceeds funded sum {funded}")]
    NegativeBalance { funded: u64, spent: u64 },
}

/// Why a single provider call did not produce a balance.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("transport error: {0}")]
    Transport(#[from] HttpError),
    #[error("upstream returned status {0}")]
    Status(u16),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Persistence or notification failure. Logged by the scan loop, never fatal there.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}
