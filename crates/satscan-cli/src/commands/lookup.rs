use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use satscan_core::{
    Dispatcher, HealthPolicy, HealthTracker, HttpClient, LookupResult, ProviderId, SystemClock,
    Unavailable,
};

use crate::cli::LookupArgs;
use crate::error::CliError;

use super::{health_now, ProviderStatus};

#[derive(Debug, Serialize)]
struct LookupResponseData {
    address: String,
    provider: ProviderId,
    balance: String,
    balance_sats: u64,
    providers: Vec<ProviderStatus>,
}

pub async fn run(
    args: &LookupArgs,
    http_client: Arc<dyn HttpClient>,
) -> Result<serde_json::Value, CliError> {
    let tracker = HealthTracker::new(args.selection.registry()?, HealthPolicy::default());
    let mut dispatcher = Dispatcher::new(tracker, http_client, Arc::new(SystemClock))
        .with_timeout(Duration::from_millis(args.timeout_ms));

    match dispatcher.lookup(&args.address).await {
        LookupResult::Balance { provider, balance } => {
            Ok(serde_json::to_value(LookupResponseData {
                address: args.address.clone(),
                provider,
                balance: balance.to_string(),
                balance_sats: balance.sats(),
                providers: health_now(&dispatcher),
            })?)
        }
        LookupResult::Unavailable(Unavailable::Exhausted) => Err(CliError::Lookup(
            String::from("no provider is currently eligible"),
        )),
        LookupResult::Unavailable(Unavailable::CallFailed { provider, error }) => Err(
            CliError::Lookup(format!("{} failed: {error}", provider.host())),
        ),
    }
}
