//! Authentication module
//!
//! Supports: token as query parameter, `Authorization: Bearer` header, or both
//!
//! A `ProviderBinding` describes one provider (base URL, auth rule, error
//! envelope, fixed parameters). The `Authenticator` merges a credential and
//! the binding's fixed parameters into an outgoing request.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::{AuthRule, ProviderBinding};
