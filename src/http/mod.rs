//! HTTP module
//!
//! The `Transport` trait is the fetch primitive the engine depends on.
//! `HttpClient` is the reqwest-backed transport; it owns retries, backoff
//! and rate limiting. `AuthenticatedRequester` binds a transport to one
//! provider and one credential.

mod client;
mod rate_limit;
mod requester;
mod transport;

pub use client::{HttpClient, HttpClientConfig, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use requester::AuthenticatedRequester;
pub use transport::Transport;
