//! Authenticator implementation
//!
//! Merges a credential and a binding's fixed parameters into an outgoing request.

use super::types::{AuthRule, ProviderBinding};
use crate::http::RequestConfig;
use url::Url;

/// Applies one credential to requests for one provider
#[derive(Clone)]
pub struct Authenticator {
    rule: AuthRule,
    token: String,
}

impl Authenticator {
    /// Create a new authenticator
    pub fn new(rule: AuthRule, token: impl Into<String>) -> Self {
        Self {
            rule,
            token: token.into(),
        }
    }

    /// Apply the binding's fixed parameters and the credential to a request.
    ///
    /// Provider parameters override caller parameters with the same name.
    /// Query parameters already carried by `url` (cursor links usually embed
    /// the token) are left alone.
    pub fn apply(&self, binding: &ProviderBinding, url: &Url, mut req: RequestConfig) -> RequestConfig {
        let in_url = |key: &str| url.query_pairs().any(|(k, _)| k == key);

        for (key, value) in &binding.fixed_query {
            if !in_url(key) {
                req.query.insert(key.clone(), value.clone());
            }
        }

        for (key, value) in &binding.fixed_headers {
            req.headers.insert(key.clone(), value.clone());
        }

        if let Some(param) = self.rule.query_param() {
            if !in_url(param) {
                req.query.insert(param.to_string(), self.token.clone());
            }
        }

        if self.rule.uses_bearer() {
            req.headers
                .insert("Authorization".to_string(), format!("Bearer {}", self.token));
        }

        req
    }

    /// Get the auth rule
    pub fn rule(&self) -> &AuthRule {
        &self.rule
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("rule", &self.rule)
            .field("token", &"<redacted>")
            .finish()
    }
}
