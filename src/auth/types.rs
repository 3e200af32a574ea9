//! Provider binding types
//!
//! These types describe how one provider expects to be called: where the
//! credential goes, where errors show up and how pages are laid out.

use crate::pagination::EnvelopeLayout;
use crate::types::StringMap;
use serde::{Deserialize, Serialize};

/// Where the access token is injected
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthRule {
    /// No credential is sent
    #[default]
    None,

    /// Token as a query parameter (e.g. `access_token=...`)
    Query {
        /// Query parameter name
        param: String,
    },

    /// Token as `Authorization: Bearer <token>`
    Bearer,

    /// Token both as a query parameter and as a bearer header
    QueryAndBearer {
        /// Query parameter name
        param: String,
    },
}

impl AuthRule {
    /// Token as the given query parameter
    pub fn query(param: impl Into<String>) -> Self {
        Self::Query {
            param: param.into(),
        }
    }

    /// Query parameter name carrying the token, if any
    pub fn query_param(&self) -> Option<&str> {
        match self {
            Self::Query { param } | Self::QueryAndBearer { param } => Some(param),
            Self::None | Self::Bearer => None,
        }
    }

    /// Whether the token is sent as a bearer header
    pub fn uses_bearer(&self) -> bool {
        matches!(self, Self::Bearer | Self::QueryAndBearer { .. })
    }
}

/// Immutable description of one provider
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderBinding {
    /// Provider tag attached to every request and error (e.g. "facebook")
    pub tag: String,
    /// Base URL relative paths are resolved against
    pub base_url: String,
    /// Credential injection rule
    pub auth: AuthRule,
    /// Path of the error field in responses; a truthy value fails the request
    pub error_path: String,
    /// Path to unwrap from every successful response (e.g. VK's "response")
    pub unwrap_path: Option<String>,
    /// Query parameters sent with every request
    pub fixed_query: StringMap,
    /// Headers sent with every request
    pub fixed_headers: StringMap,
    /// How a page is laid out in a response
    pub layout: EnvelopeLayout,
}

impl ProviderBinding {
    /// Create a binding with no auth, `error` as the error field and a bare-array layout
    pub fn new(tag: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            base_url: base_url.into(),
            auth: AuthRule::None,
            error_path: "error".to_string(),
            unwrap_path: None,
            fixed_query: StringMap::new(),
            fixed_headers: StringMap::new(),
            layout: EnvelopeLayout::default(),
        }
    }

    /// Set the auth rule
    #[must_use]
    pub fn with_auth(mut self, auth: AuthRule) -> Self {
        self.auth = auth;
        self
    }

    /// Set the error field path
    #[must_use]
    pub fn with_error_path(mut self, path: impl Into<String>) -> Self {
        self.error_path = path.into();
        self
    }

    /// Unwrap this path from every successful response
    #[must_use]
    pub fn with_unwrap_path(mut self, path: impl Into<String>) -> Self {
        self.unwrap_path = Some(path.into());
        self
    }

    /// Add a fixed query parameter
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fixed_query.insert(key.into(), value.into());
        self
    }

    /// Add a fixed header
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fixed_headers.insert(key.into(), value.into());
        self
    }

    /// Set the page layout
    #[must_use]
    pub fn with_layout(mut self, layout: EnvelopeLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Replace the base URL (used to point a built-in binding at a proxy or mock)
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}
