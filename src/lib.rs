// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # pagecrawl
//!
//! Retrieves complete collections from paginated provider APIs and assembles
//! them into one keyed aggregate.
//!
//! ## Features
//!
//! - **Uniform auth**: one `AuthenticatedRequester` per provider binding injects
//!   tokens and turns provider error envelopes into `Error::RemoteApi`
//! - **Cursor-link pagination**: follow `next` references page by page
//! - **Batch fan-out**: probe for the total, then fetch offset batches concurrently
//! - **Bounded cursor walk**: walk backwards by item identifier up to a target count
//! - **Orchestration**: run named sub-queries concurrently, fail on the first error
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pagecrawl::{CrawlConfig, CrawlTarget, Crawler, Provider};
//!
//! #[tokio::main]
//! async fn main() -> pagecrawl::Result<()> {
//!     let crawler = Crawler::new(CrawlConfig::default())?;
//!     let target = CrawlTarget::new("access-token").with_subject("1");
//!     let aggregate = crawler.crawl(Provider::Vk, &target).await?;
//!     println!("{}", aggregate.into_value());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 Crawler (providers: fb / vk / tw / li)          │
//! └────────────────────────────────┬────────────────────────────────┘
//!                                  │
//! ┌────────────────────────────────┴────────────────────────────────┐
//! │          CollectionOrchestrator  run(base, sub-queries)         │
//! ├─────────────────────┬─────────────────────┬─────────────────────┤
//! │ PageWalker          │ BatchFanOutFetcher  │ BoundedCursorWalker │
//! │ (cursor links)      │ (offset batches)    │ (max_id walk)       │
//! ├─────────────────────┴─────────────────────┴─────────────────────┤
//! │        AuthenticatedRequester  (ProviderBinding + token)        │
//! ├─────────────────────────────────────────────────────────────────┤
//! │        Transport  (HttpClient: retry, backoff, rate limit)      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the crate
pub mod error;

/// Common types and type aliases
pub mod types;

/// Provider bindings and credential injection
pub mod auth;

/// Transport, HTTP client and authenticated requester
pub mod http;

/// Pagination strategies
pub mod pagination;

/// Sub-query orchestration
pub mod engine;

/// Crawl configuration
pub mod config;

/// Built-in provider crawls
pub mod providers;

/// Top-level crawler entry point
pub mod crawler;

#[cfg(test)]
pub(crate) mod test_support;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use auth::{AuthRule, ProviderBinding};
pub use config::CrawlConfig;
pub use crawler::{CrawlTarget, Crawler};
pub use engine::{AggregateResult, BaseSeed, CollectionOrchestrator, NamedSubQuery};
pub use http::{AuthenticatedRequester, HttpClient, RequestConfig, Transport};
pub use pagination::{PageEnvelope, PaginationRequest};
pub use providers::Provider;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
