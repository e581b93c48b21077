//! Scripted transports, sleepers and sinks shared by the behaviour tests.

#![allow(dead_code)]

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use satscan_core::sink::{HitRecord, HitStore, Notifier, NotifyOutcome};
use satscan_core::{
    HttpClient, HttpError, HttpRequest, HttpResponse, ProviderId, Sleeper, SinkError,
};

pub const EMPTY_ESPLORA: &str = r#"{"chain_stats":{"funded_txo_sum":0,"spent_txo_sum":0}}"#;
pub const FUNDED_ESPLORA: &str =
    r#"{"chain_stats":{"funded_txo_sum":500000000,"spent_txo_sum":100000000}}"#;

type Responder = dyn Fn(&HttpRequest) -> Result<HttpResponse, HttpError> + Send + Sync;

/// Transport that answers from a closure and remembers every request.
pub struct ScriptedHttpClient {
    responder: Box<Responder>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    pub fn new<F>(responder: F) -> Arc<Self>
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse, HttpError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Every provider reports an empty address.
    pub fn always_empty() -> Arc<Self> {
        Self::new(|request| Ok(HttpResponse::ok_json(empty_body_for(&request.url))))
    }

    /// `failing` providers time out, the rest report an empty address.
    pub fn failing(failing: &[ProviderId]) -> Arc<Self> {
        let failing = failing.to_vec();
        Self::new(move |request| {
            if failing
                .iter()
                .any(|provider| request.url.contains(provider.host()))
            {
                Err(HttpError::timeout("request timeout"))
            } else {
                Ok(HttpResponse::ok_json(empty_body_for(&request.url)))
            }
        })
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("request log").clone()
    }

    /// Provider hosts in request order.
    pub fn hosts(&self) -> Vec<ProviderId> {
        self.requests()
            .iter()
            .filter_map(|request| {
                ProviderId::ALL
                    .into_iter()
                    .find(|provider| request.url.contains(provider.host()))
            })
            .collect()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let response = (self.responder)(&request);
        self.requests.lock().expect("request log").push(request);
        Box::pin(async move { response })
    }
}

pub fn empty_body_for(url: &str) -> &'static str {
    if url.contains(ProviderId::BlockchainInfo.host()) {
        r#"{"final_balance":0}"#
    } else {
        EMPTY_ESPLORA
    }
}

/// Sleeper that returns immediately and records what it was asked to wait.
#[derive(Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().expect("sleep log").clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep<'a>(&'a self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        self.sleeps.lock().expect("sleep log").push(duration);
        Box::pin(async {})
    }
}

/// Sleeper that never wakes, for shutdown tests.
#[derive(Default)]
pub struct StalledSleeper {
    calls: AtomicUsize,
}

impl StalledSleeper {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Sleeper for StalledSleeper {
    fn sleep<'a>(&'a self, _duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(std::future::pending())
    }
}

/// Ordered log of sink calls shared between the store and notifier fakes.
pub type SinkLog = Arc<Mutex<Vec<String>>>;

pub struct RecordingStore {
    log: SinkLog,
    pub fail: bool,
}

impl RecordingStore {
    pub fn new(log: SinkLog) -> Self {
        Self { log, fail: false }
    }
}

impl HitStore for RecordingStore {
    fn append<'a>(
        &'a self,
        record: &'a HitRecord,
    ) -> Pin<Box<dyn Future<Output = Result<(), SinkError>> + Send + 'a>> {
        Box::pin(async move {
            self.log
                .lock()
                .expect("sink log")
                .push(format!("persist:{}", record.address));
            if self.fail {
                return Err(SinkError::Io(std::io::Error::other("disk unavailable")));
            }
            Ok(())
        })
    }
}

pub struct RecordingNotifier {
    log: SinkLog,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn new(log: SinkLog) -> Self {
        Self { log, fail: false }
    }
}

impl Notifier for RecordingNotifier {
    fn notify<'a>(
        &'a self,
        record: &'a HitRecord,
    ) -> Pin<Box<dyn Future<Output = Result<NotifyOutcome, SinkError>> + Send + 'a>> {
        Box::pin(async move {
            self.log
                .lock()
                .expect("sink log")
                .push(format!("notify:{}", record.address));
            if self.fail {
                return Err(SinkError::Delivery(String::from("relay unreachable")));
            }
            Ok(NotifyOutcome::Delivered)
        })
    }
}
