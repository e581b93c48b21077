mod hits;
mod lookup;
mod providers;
mod scan;

use std::sync::Arc;

use satscan_core::{Clock, Dispatcher, HealthSnapshot, HttpClient, ProviderId, ReqwestHttpClient};
use serde::Serialize;
use serde_json::Value;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<Value, CliError> {
    match &cli.command {
        Command::Scan(args) => scan::run(args, http_client()).await,
        Command::Lookup(args) => lookup::run(args, http_client()).await,
        Command::Providers(args) => providers::run(args),
        Command::Hits(args) => hits::run(args),
    }
}

fn http_client() -> Arc<dyn HttpClient> {
    Arc::new(ReqwestHttpClient::new())
}

/// Serializable provider health row shared by `scan` and `lookup` output.
#[derive(Debug, Serialize)]
struct ProviderStatus {
    id: ProviderId,
    host: &'static str,
    status: &'static str,
    consecutive_failures: u32,
    blocked_for_secs: Option<u64>,
}

fn provider_statuses(snapshots: Vec<HealthSnapshot>) -> Vec<ProviderStatus> {
    snapshots
        .into_iter()
        .map(|snapshot| ProviderStatus {
            id: snapshot.id,
            host: snapshot.id.host(),
            status: snapshot.status_label(),
            consecutive_failures: snapshot.consecutive_failures,
            blocked_for_secs: snapshot.blocked_for.map(|remaining| remaining.as_secs()),
        })
        .collect()
}

fn health_now(dispatcher: &Dispatcher) -> Vec<ProviderStatus> {
    let now = dispatcher.clock().now();
    provider_statuses(dispatcher.tracker().snapshot(now))
}
