//! CLI argument definitions for satscan.
//!
//! | Command | Description |
//! |---------|-------------|
//! | `scan` | Run the lookup loop over a watch list until interrupted |
//! | `lookup` | Look up a single address once |
//! | `providers` | List the configured balance providers |
//! | `hits` | Summarise the hit file |
//!
//! ```bash
//! satscan scan --watchlist addresses.txt --iterations 100
//! satscan lookup 1BoatSLRHtKNngkdXEeobR76b53LETtpyT --provider mempool
//! satscan hits --pretty
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use satscan_core::sink::store::DEFAULT_HIT_PATH;
use satscan_core::{ConfigError, ProviderId, ProviderRegistry};

#[derive(Debug, Parser)]
#[command(
    name = "satscan",
    author,
    version,
    about = "Address balance scanner with provider failover and adaptive pacing"
)]
pub struct Cli {
    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Environment file loaded before running; process variables take precedence.
    #[arg(long, global = true, default_value = ".env")]
    pub env_file: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scan addresses from a watch list until interrupted.
    Scan(ScanArgs),
    /// Look up a single address once.
    Lookup(LookupArgs),
    /// List configured balance providers.
    Providers(ProvidersArgs),
    /// Summarise recorded hits.
    Hits(HitsArgs),
}

/// Repeatable `--provider` selection; empty means every provider.
#[derive(Debug, Clone, Args)]
pub struct ProviderSelection {
    /// Restrict lookups to these providers (mempool, blockstream, blockchain_info).
    #[arg(long = "provider", value_parser = parse_provider)]
    pub providers: Vec<ProviderId>,
}

impl ProviderSelection {
    pub fn registry(&self) -> Result<ProviderRegistry, ConfigError> {
        if self.providers.is_empty() {
            Ok(ProviderRegistry::default())
        } else {
            ProviderRegistry::only(&self.providers)
        }
    }
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// File with one address per line.
    #[arg(long)]
    pub watchlist: PathBuf,

    /// Append-only hit file.
    #[arg(long, default_value = DEFAULT_HIT_PATH)]
    pub output: PathBuf,

    #[command(flatten)]
    pub selection: ProviderSelection,

    /// Stop after this many iterations.
    #[arg(long)]
    pub iterations: Option<u64>,

    #[arg(long, default_value_t = 1_500)]
    pub base_delay_ms: u64,

    #[arg(long, default_value_t = 4_000)]
    pub max_delay_ms: u64,

    /// Upper bound of the random jitter added to every pause.
    #[arg(long, default_value_t = 1_500)]
    pub jitter_ms: u64,

    /// Per-request timeout.
    #[arg(long, default_value_t = 10_000)]
    pub timeout_ms: u64,

    /// Disable push notifications even when a token is configured.
    #[arg(long)]
    pub no_notify: bool,
}

#[derive(Debug, Args)]
pub struct LookupArgs {
    pub address: String,

    #[command(flatten)]
    pub selection: ProviderSelection,

    #[arg(long, default_value_t = 10_000)]
    pub timeout_ms: u64,
}

#[derive(Debug, Args)]
pub struct ProvidersArgs {
    #[command(flatten)]
    pub selection: ProviderSelection,
}

#[derive(Debug, Args)]
pub struct HitsArgs {
    #[arg(long, default_value = DEFAULT_HIT_PATH)]
    pub output: PathBuf,
}

fn parse_provider(value: &str) -> Result<ProviderId, String> {
    value.parse().map_err(|error: ConfigError| error.to_string())
}
