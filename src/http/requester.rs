//! Authenticated requester
//!
//! Binds a transport to one provider and one credential. Every request goes
//! through the same steps: resolve the URL, inject the credential and fixed
//! parameters, fetch, reject provider error envelopes, unwrap.

use super::client::RequestConfig;
use super::transport::Transport;
use crate::auth::{Authenticator, ProviderBinding};
use crate::error::{Error, Result};
use crate::pagination::PageEnvelope;
use crate::types::lookup_path;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Sends requests on behalf of one provider and one credential.
///
/// Immutable after construction, so one instance is shared (behind an `Arc`)
/// by every concurrent operation of a crawl.
pub struct AuthenticatedRequester {
    transport: Arc<dyn Transport>,
    binding: ProviderBinding,
    authenticator: Authenticator,
}

impl AuthenticatedRequester {
    /// Create a requester for `binding` using `token`
    pub fn new(
        transport: Arc<dyn Transport>,
        binding: ProviderBinding,
        token: impl Into<String>,
    ) -> Self {
        let authenticator = Authenticator::new(binding.auth.clone(), token);
        Self {
            transport,
            binding,
            authenticator,
        }
    }

    /// The provider binding
    pub fn binding(&self) -> &ProviderBinding {
        &self.binding
    }

    /// The provider tag
    pub fn provider(&self) -> &str {
        &self.binding.tag
    }

    /// Send a request and parse the body as a page
    pub async fn send(&self, path: &str, request: RequestConfig) -> Result<PageEnvelope> {
        let body = self.send_raw(path, request).await?;
        PageEnvelope::from_value(&body, &self.binding.layout)
    }

    /// Send a request and return the unwrapped body
    pub async fn send_raw(&self, path: &str, request: RequestConfig) -> Result<Value> {
        let url = self.resolve_url(path)?;
        let request = self
            .authenticator
            .apply(&self.binding, &url, request)
            .tag(self.binding.tag.clone());

        debug!(provider = %self.binding.tag, url = %url, "Sending request");
        let body = match self.transport.fetch(url.as_str(), request).await {
            Ok(body) => body,
            Err(Error::HttpStatus { status, body }) => {
                return Err(self.status_error(status, body));
            }
            Err(e) => return Err(e),
        };

        if let Some(error) = self.error_envelope(&body) {
            return Err(Error::remote_api(&self.binding.tag, error.clone()));
        }

        match &self.binding.unwrap_path {
            Some(path) => lookup_path(&body, path).cloned().ok_or_else(|| {
                Error::protocol(format!(
                    "[{}] response has no '{path}' field",
                    self.binding.tag
                ))
            }),
            None => Ok(body),
        }
    }

    /// A truthy value at the binding's error path
    fn error_envelope<'a>(&self, body: &'a Value) -> Option<&'a Value> {
        lookup_path(body, &self.binding.error_path).filter(|error| is_truthy(error))
    }

    /// Providers also send their error envelope with 4xx/5xx statuses
    fn status_error(&self, status: u16, body: String) -> Error {
        let envelope = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|parsed| self.error_envelope(&parsed).cloned());
        match envelope {
            Some(error) => {
                debug!(provider = %self.binding.tag, status, "Error envelope on HTTP status");
                Error::remote_api(&self.binding.tag, error)
            }
            None => Error::http_status(status, body),
        }
    }

    /// Resolve a path against the base URL; absolute URLs are kept as-is
    pub fn resolve_url(&self, path: &str) -> Result<Url> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Ok(Url::parse(path)?);
        }

        let base = self.binding.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }
}

impl std::fmt::Debug for AuthenticatedRequester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedRequester")
            .field("binding", &self.binding)
            .field("authenticator", &self.authenticator)
            .finish_non_exhaustive()
    }
}

/// An error field counts only when it carries something
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
