//! Behaviour tests for the scan loop state machine.

mod support;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use satscan_core::{
    AdaptivePacer, Balance, Cooldown, Dispatcher, HealthPolicy, HealthTracker, HttpResponse,
    ManualClock, PacerConfig, ProviderId, ProviderRegistry, ScanConfig, ScanLoop, ScanOutcome,
    Unavailable, WatchlistGenerator,
};
use tokio::sync::watch;

use support::{
    RecordingNotifier, RecordingSleeper, RecordingStore, ScriptedHttpClient, SinkLog,
    StalledSleeper, FUNDED_ESPLORA,
};

struct Harness {
    scan: ScanLoop,
    log: SinkLog,
    sleeper: Arc<RecordingSleeper>,
}

fn harness(client: Arc<ScriptedHttpClient>, policy: HealthPolicy, notify_fails: bool) -> Harness {
    let log: SinkLog = Arc::new(Mutex::new(Vec::new()));
    let sleeper = Arc::new(RecordingSleeper::default());
    let mut notifier = RecordingNotifier::new(log.clone());
    notifier.fail = notify_fails;

    let dispatcher = Dispatcher::new(
        HealthTracker::new(ProviderRegistry::default(), policy),
        client,
        Arc::new(ManualClock::default()),
    );
    let generator = WatchlistGenerator::new(vec![
        String::from("1AddrOne"),
        String::from("1AddrTwo"),
    ])
    .expect("non-empty watchlist");
    let pacer = AdaptivePacer::new(PacerConfig {
        max_jitter: Duration::ZERO,
        ..PacerConfig::default()
    })
    .expect("valid pacer");

    let scan = ScanLoop::new(
        Box::new(generator),
        dispatcher,
        Arc::new(RecordingStore::new(log.clone())),
        Arc::new(notifier),
    )
    .with_pacer(pacer)
    .with_sleeper(sleeper.clone());

    Harness {
        scan,
        log,
        sleeper,
    }
}

fn funded_mempool() -> Arc<ScriptedHttpClient> {
    ScriptedHttpClient::new(|request| {
        if request.url.contains(ProviderId::Mempool.host()) {
            Ok(HttpResponse::ok_json(FUNDED_ESPLORA))
        } else {
            Ok(HttpResponse::ok_json(support::empty_body_for(&request.url)))
        }
    })
}

// =============================================================================
// HIT / MISS
// =============================================================================

#[tokio::test]
async fn hit_persists_then_notifies_exactly_once() {
    // Given: mempool reports 4 BTC for every address
    let mut harness = harness(funded_mempool(), HealthPolicy::default(), false);

    // When: one iteration runs
    let outcome = harness.scan.step().await;

    // Then: it is a hit, persisted once and then notified once
    assert_eq!(
        outcome,
        ScanOutcome::Hit {
            address: String::from("1AddrOne"),
            provider: ProviderId::Mempool,
            balance: Balance::from_sats(400_000_000),
        }
    );
    assert_eq!(
        *harness.log.lock().expect("sink log"),
        vec!["persist:1AddrOne", "notify:1AddrOne"]
    );
    assert_eq!(harness.scan.stats().found, 1);
}

#[tokio::test]
async fn failed_notification_does_not_stop_scanning() {
    let mut harness = harness(funded_mempool(), HealthPolicy::default(), true);
    let (_tx, rx) = watch::channel(false);
    harness.scan = harness.scan.with_config(ScanConfig {
        max_iterations: Some(4),
        ..ScanConfig::default()
    });

    let stats = harness.scan.run(rx).await;

    // Iterations 1 and 4 land on mempool.
    assert_eq!(stats.total, 4);
    assert_eq!(stats.found, 2);
    assert_eq!(
        *harness.log.lock().expect("sink log"),
        vec![
            "persist:1AddrOne",
            "notify:1AddrOne",
            "persist:1AddrTwo",
            "notify:1AddrTwo",
        ]
    );
}

#[tokio::test]
async fn miss_calls_no_sink_and_relaxes_pacer() {
    let mut harness = harness(
        ScriptedHttpClient::always_empty(),
        HealthPolicy::default(),
        false,
    );

    let outcome = harness.scan.step().await;
    let cooldown = harness.scan.cooldown(&outcome);

    assert!(matches!(outcome, ScanOutcome::Miss { .. }));
    assert!(harness.log.lock().expect("sink log").is_empty());
    assert_eq!(cooldown, Cooldown::Paced(Duration::from_millis(1_500)));
}

// =============================================================================
// UNAVAILABLE
// =============================================================================

#[tokio::test]
async fn call_failure_grows_pacer_delay_and_failure_streak() {
    let mut harness = harness(
        ScriptedHttpClient::failing(&ProviderId::ALL),
        HealthPolicy::default(),
        false,
    );

    let mut cooldowns = Vec::new();
    for _ in 0..3 {
        let outcome = harness.scan.step().await;
        assert!(!outcome.is_success());
        cooldowns.push(harness.scan.cooldown(&outcome));
    }

    assert_eq!(
        cooldowns,
        vec![
            Cooldown::Paced(Duration::from_millis(2_300)),
            Cooldown::Paced(Duration::from_millis(3_100)),
            Cooldown::Paced(Duration::from_millis(3_900)),
        ]
    );
    assert_eq!(harness.scan.stats().consecutive_failures, 3);
}

fn suspend_after_first_failure() -> HealthPolicy {
    HealthPolicy {
        fail_limit: 1,
        block_duration: Duration::from_secs(600),
    }
}

#[tokio::test]
async fn exhaustion_adds_fixed_pause_on_top_of_failure_pacing() {
    // Given: every provider is suspended after its first failure
    let mut harness = harness(
        ScriptedHttpClient::failing(&ProviderId::ALL),
        suspend_after_first_failure(),
        false,
    );
    for _ in 0..3 {
        let outcome = harness.scan.step().await;
        harness.scan.cooldown(&outcome);
    }
    assert_eq!(harness.scan.pacer().current_delay(), Duration::from_millis(3_900));

    // When: the next iteration finds no eligible provider
    let outcome = harness.scan.step().await;
    let cooldown = harness.scan.cooldown(&outcome);

    // Then: the pacer takes its failure step and the 60 second pause comes on top
    assert_eq!(outcome, ScanOutcome::Unavailable(Unavailable::Exhausted));
    assert_eq!(
        cooldown,
        Cooldown::Exhausted {
            pause: Duration::from_secs(60),
            paced: Duration::from_millis(4_000),
        }
    );
    assert_eq!(cooldown.duration(), Duration::from_millis(64_000));
    assert_eq!(harness.scan.pacer().current_delay(), Duration::from_millis(4_000));
    assert_eq!(harness.scan.stats().consecutive_failures, 4);
}

#[tokio::test]
async fn exhausted_run_never_folds_fixed_pause_into_delay() {
    let mut harness = harness(
        ScriptedHttpClient::failing(&ProviderId::ALL),
        suspend_after_first_failure(),
        false,
    );
    harness.scan = harness.scan.with_config(ScanConfig {
        max_iterations: Some(5),
        ..ScanConfig::default()
    });
    let (_tx, rx) = watch::channel(false);

    harness.scan.run(rx).await;

    assert_eq!(
        harness.sleeper.sleeps(),
        vec![
            Duration::from_millis(2_300),
            Duration::from_millis(3_100),
            Duration::from_millis(3_900),
            Duration::from_millis(64_000),
            Duration::from_millis(64_000),
        ]
    );
    assert_eq!(harness.scan.pacer().current_delay(), Duration::from_millis(4_000));
}

#[tokio::test]
async fn success_after_failures_resets_streak() {
    let client = ScriptedHttpClient::failing(&[ProviderId::Mempool]);
    let mut harness = harness(client, HealthPolicy::default(), false);

    let first = harness.scan.step().await;
    assert!(!first.is_success());
    assert_eq!(harness.scan.stats().consecutive_failures, 1);

    let second = harness.scan.step().await;
    assert!(second.is_success());
    assert_eq!(harness.scan.stats().consecutive_failures, 0);
}

// =============================================================================
// Run loop
// =============================================================================

#[tokio::test]
async fn run_sleeps_after_every_iteration_until_limit() {
    let mut harness = harness(
        ScriptedHttpClient::always_empty(),
        HealthPolicy::default(),
        false,
    );
    harness.scan = harness.scan.with_config(ScanConfig {
        max_iterations: Some(3),
        ..ScanConfig::default()
    });
    let (_tx, rx) = watch::channel(false);

    let stats = harness.scan.run(rx).await;

    assert_eq!(stats.total, 3);
    assert_eq!(stats.found, 0);
    assert_eq!(
        harness.sleeper.sleeps(),
        vec![Duration::from_millis(1_500); 3]
    );
}

#[tokio::test]
async fn shutdown_before_start_runs_no_iteration() {
    let mut harness = harness(
        ScriptedHttpClient::always_empty(),
        HealthPolicy::default(),
        false,
    );
    let (_tx, rx) = watch::channel(true);

    let stats = harness.scan.run(rx).await;

    assert_eq!(stats.total, 0);
    assert!(harness.sleeper.sleeps().is_empty());
}

#[tokio::test]
async fn shutdown_interrupts_a_pending_pause() {
    let harness = harness(
        ScriptedHttpClient::always_empty(),
        HealthPolicy::default(),
        false,
    );
    let mut scan = harness.scan.with_sleeper(Arc::new(StalledSleeper::default()));
    let (tx, rx) = watch::channel(false);

    let stop = async move {
        tokio::task::yield_now().await;
        tx.send(true).expect("scan loop still listening");
    };
    let (stats, ()) = tokio::join!(scan.run(rx), stop);

    assert_eq!(stats.total, 1);
}

#[tokio::test]
async fn pause_survives_a_signal_that_stays_false() {
    let harness = harness(
        ScriptedHttpClient::always_empty(),
        HealthPolicy::default(),
        false,
    );
    let sleeper = Arc::new(StalledSleeper::default());
    let mut scan = harness.scan.with_sleeper(sleeper.clone());
    let (tx, rx) = watch::channel(false);

    let control = async move {
        tokio::task::yield_now().await;
        tx.send(false).expect("scan loop still listening");
        tokio::time::sleep(Duration::from_millis(20)).await;
        let pauses_before_stop = sleeper.calls();
        tx.send(true).expect("scan loop still listening");
        pauses_before_stop
    };
    let (stats, pauses_before_stop) = tokio::join!(scan.run(rx), control);

    assert_eq!(pauses_before_stop, 1);
    assert_eq!(stats.total, 1);
}
