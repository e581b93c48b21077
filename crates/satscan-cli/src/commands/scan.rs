use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{info, warn};

use satscan_core::{
    AdaptivePacer, Dispatcher, HealthPolicy, HealthTracker, HttpClient, NdjsonHitStore,
    NoopNotifier, Notifier, PacerConfig, PushPlusNotifier, ScanConfig, ScanLoop, ScanStats,
    SystemClock, WatchlistGenerator,
};

use crate::cli::ScanArgs;
use crate::error::CliError;

use super::{health_now, ProviderStatus};

#[derive(Debug, Serialize)]
struct ScanResponseData {
    run_id: String,
    output: String,
    stats: ScanStats,
    final_delay_ms: u64,
    providers: Vec<ProviderStatus>,
}

pub async fn run(
    args: &ScanArgs,
    http_client: Arc<dyn HttpClient>,
) -> Result<serde_json::Value, CliError> {
    let registry = args.selection.registry()?;
    let pacer = AdaptivePacer::new(PacerConfig {
        base_delay: Duration::from_millis(args.base_delay_ms),
        max_delay: Duration::from_millis(args.max_delay_ms),
        max_jitter: Duration::from_millis(args.jitter_ms),
        ..PacerConfig::default()
    })?;
    let generator = WatchlistGenerator::from_file(&args.watchlist)?;
    info!(
        addresses = generator.len(),
        providers = registry.len(),
        "watch list loaded"
    );

    let dispatcher = Dispatcher::new(
        HealthTracker::new(registry, HealthPolicy::default()),
        Arc::clone(&http_client),
        Arc::new(SystemClock),
    )
    .with_timeout(Duration::from_millis(args.timeout_ms));
    let store = NdjsonHitStore::create(&args.output)?;
    let notifier = notifier(args.no_notify, http_client);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received; finishing current iteration");
            let _ = shutdown_tx.send(true);
        }
    });

    let mut scan = ScanLoop::new(Box::new(generator), dispatcher, Arc::new(store), notifier)
        .with_pacer(pacer)
        .with_config(ScanConfig {
            max_iterations: args.iterations,
            ..ScanConfig::default()
        });
    let stats = scan.run(shutdown_rx).await;

    Ok(serde_json::to_value(ScanResponseData {
        run_id: scan.run_id().to_string(),
        output: args.output.display().to_string(),
        stats,
        final_delay_ms: u64::try_from(scan.pacer().current_delay().as_millis())
            .unwrap_or(u64::MAX),
        providers: health_now(scan.dispatcher()),
    })?)
}

fn notifier(disabled: bool, http_client: Arc<dyn HttpClient>) -> Arc<dyn Notifier> {
    if disabled {
        return Arc::new(NoopNotifier);
    }

    let pushplus = PushPlusNotifier::from_env(http_client);
    if !pushplus.has_token() {
        warn!("PUSHPLUS_TOKEN is not set; hits will only be written to disk");
    }
    Arc::new(pushplus)
}
