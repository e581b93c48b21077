use std::env;
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{info, warn};

use super::{HitRecord, Notifier, SinkFuture};
use crate::http_client::{HttpClient, HttpRequest};
use crate::SinkError;

pub const PUSHPLUS_ENDPOINT: &str = "https://www.pushplus.plus/send";
const PUSHPLUS_TITLE: &str = "Balance found for scanned address";

/// Whether a notification actually went out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    Delivered,
    Skipped,
}

/// Notifier that never sends anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify<'a>(&'a self, _record: &'a HitRecord) -> SinkFuture<'a, NotifyOutcome> {
        Box::pin(async { Ok(NotifyOutcome::Skipped) })
    }
}

/// Delivers hit summaries through the PushPlus relay.
///
/// Without a token every call is a logged no-op.
pub struct PushPlusNotifier {
    http_client: Arc<dyn HttpClient>,
    token: Option<String>,
    endpoint: String,
}

impl PushPlusNotifier {
    pub fn new(http_client: Arc<dyn HttpClient>, token: Option<String>) -> Self {
        Self {
            http_client,
            token: token.filter(|token| !token.trim().is_empty()),
            endpoint: String::from(PUSHPLUS_ENDPOINT),
        }
    }

    /// Reads `SATSCAN_PUSHPLUS_TOKEN`, falling back to `PUSHPLUS_TOKEN`.
    pub fn from_env(http_client: Arc<dyn HttpClient>) -> Self {
        let token = env::var("SATSCAN_PUSHPLUS_TOKEN")
            .or_else(|_| env::var("PUSHPLUS_TOKEN"))
            .ok();
        Self::new(http_client, token)
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    async fn deliver(&self, token: &str, record: &HitRecord) -> Result<(), SinkError> {
        let body = json!({
            "token": token,
            "title": PUSHPLUS_TITLE,
            "content": record.summary(),
            "template": "txt",
        });
        let request = HttpRequest::post(&self.endpoint)
            .with_bearer_token(token)
            .with_json_body(&body);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|error| SinkError::Delivery(error.message().to_owned()))?;
        if !response.is_success() {
            return Err(SinkError::Delivery(format!(
                "relay returned status {}",
                response.status
            )));
        }

        // The relay answers 200 with its own status code in the body.
        if let Ok(payload) = serde_json::from_str::<Value>(&response.body) {
            if let Some(code) = payload.get("code").and_then(Value::as_i64) {
                if code != 200 {
                    let message = payload
                        .get("msg")
                        .and_then(Value::as_str)
                        .unwrap_or("unknown relay error");
                    return Err(SinkError::Delivery(format!("relay code {code}: {message}")));
                }
            }
        }

        Ok(())
    }
}

impl Notifier for PushPlusNotifier {
    fn notify<'a>(&'a self, record: &'a HitRecord) -> SinkFuture<'a, NotifyOutcome> {
        Box::pin(async move {
            let Some(token) = self.token.as_deref() else {
                warn!("PUSHPLUS_TOKEN is not set; skipping notification");
                return Ok(NotifyOutcome::Skipped);
            };

            self.deliver(token, record).await?;
            info!(address = %record.address, "hit notification delivered");
            Ok(NotifyOutcome::Delivered)
        })
    }
}
