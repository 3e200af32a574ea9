//! The fetch primitive

use super::client::RequestConfig;
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Fetches one URL and returns its JSON body.
///
/// Implementations own HTTP semantics, retries and serialization. The
/// engine only ever sees a parsed body or an error.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch `url` with the given query, headers, body, method and tags
    async fn fetch(&self, url: &str, request: RequestConfig) -> Result<Value>;
}
