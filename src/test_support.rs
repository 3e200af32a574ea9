//! Scripted transport for unit tests

use crate::auth::{AuthRule, ProviderBinding};
use crate::error::Result;
use crate::http::{AuthenticatedRequester, RequestConfig, Transport};
use crate::pagination::EnvelopeLayout;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Handler = dyn Fn(&str, &RequestConfig) -> (Duration, Result<Value>) + Send + Sync;

/// A request seen by the scripted transport
#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub url: String,
    pub request: RequestConfig,
}

impl RecordedCall {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.request.query.get(key).map(String::as_str)
    }
}

/// Answers every fetch from a closure and records what was asked
pub(crate) struct ScriptedTransport {
    handler: Box<Handler>,
    calls: Mutex<Vec<RecordedCall>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl ScriptedTransport {
    /// Respond immediately
    pub fn respond<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&str, &RequestConfig) -> Result<Value> + Send + Sync + 'static,
    {
        Self::respond_after(move |url, req| (Duration::ZERO, handler(url, req)))
    }

    /// Respond after a per-call delay
    pub fn respond_after<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&str, &RequestConfig) -> (Duration, Result<Value>) + Send + Sync + 'static,
    {
        Arc::new(Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Most fetches that were pending at the same time
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn fetch(&self, url: &str, request: RequestConfig) -> Result<Value> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let (delay, result) = (self.handler)(url, &request);
        self.calls.lock().unwrap().push(RecordedCall {
            url: url.to_string(),
            request,
        });
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Binding with `data`/`paging.next`/`count` layout and a query token
pub(crate) fn test_binding() -> ProviderBinding {
    ProviderBinding::new("test", "https://api.test")
        .with_auth(AuthRule::query("access_token"))
        .with_layout(
            EnvelopeLayout::items("data")
                .with_next_cursor("paging.next")
                .with_total("count"),
        )
}

pub(crate) fn requester(
    transport: &Arc<ScriptedTransport>,
    binding: ProviderBinding,
) -> AuthenticatedRequester {
    AuthenticatedRequester::new(transport.clone(), binding, "tok")
}
