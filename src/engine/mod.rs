//! Execution engine module
//!
//! Runs named sub-queries concurrently against one requester.
//!
//! # Overview
//!
//! - `CollectionOrchestrator` - validates keys, dispatches each request to its
//!   pagination strategy, waits for all and merges the outcomes
//! - `AggregateResult` - the merged mapping, optionally seeded with a base entry
//!
//! The first failure wins: it is returned annotated with its key, in-flight
//! siblings are dropped and nothing partial is ever returned.

mod types;

pub use types::{AggregateResult, BaseSeed, NamedSubQuery};

use crate::error::{Error, Result};
use crate::http::AuthenticatedRequester;
use crate::pagination::{
    BatchFanOutFetcher, BoundedCursorWalker, CursorLinkSource, PageWalker, PaginationRequest,
};
use crate::types::Record;
use futures::future::try_join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Dispatches sub-queries to the pagination strategies
#[derive(Debug, Clone)]
pub struct CollectionOrchestrator {
    requester: Arc<AuthenticatedRequester>,
    page_walker: PageWalker,
    fan_out: BatchFanOutFetcher,
    cursor_walker: BoundedCursorWalker,
}

impl CollectionOrchestrator {
    /// Create an orchestrator with default strategy settings
    pub fn new(requester: Arc<AuthenticatedRequester>) -> Self {
        Self {
            requester,
            page_walker: PageWalker::default(),
            fan_out: BatchFanOutFetcher::default(),
            cursor_walker: BoundedCursorWalker::default(),
        }
    }

    /// Use a configured page walker
    #[must_use]
    pub fn with_page_walker(mut self, walker: PageWalker) -> Self {
        self.page_walker = walker;
        self
    }

    /// Use a configured fan-out fetcher
    #[must_use]
    pub fn with_fan_out(mut self, fetcher: BatchFanOutFetcher) -> Self {
        self.fan_out = fetcher;
        self
    }

    /// Use a configured cursor walker
    #[must_use]
    pub fn with_cursor_walker(mut self, walker: BoundedCursorWalker) -> Self {
        self.cursor_walker = walker;
        self
    }

    /// The shared requester
    pub fn requester(&self) -> &AuthenticatedRequester {
        &self.requester
    }

    /// Run every sub-query and merge the results.
    ///
    /// Keys are validated before any request is sent.
    pub async fn run(
        &self,
        base: Option<BaseSeed>,
        queries: Vec<NamedSubQuery>,
    ) -> Result<AggregateResult> {
        validate_keys(base.as_ref(), &queries)?;

        let start = Instant::now();
        let provider = self.requester.provider();
        info!(provider, sub_queries = queries.len(), "Starting collection run");

        let outcomes = try_join_all(queries.into_iter().map(|query| async move {
            let NamedSubQuery { key, request } = query;
            debug!(provider, key = %key, strategy = request.strategy_name(), "Dispatching");
            match self.dispatch(request).await {
                Ok(items) => {
                    debug!(provider, key = %key, items = items.len(), "Sub-query complete");
                    Ok((key, items))
                }
                Err(e) => Err(Error::sub_query(key, e)),
            }
        }))
        .await?;

        let mut aggregate = AggregateResult::new(base);
        for (key, items) in outcomes {
            aggregate.insert(key, items);
        }

        info!(
            provider,
            records = aggregate.total_records(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Completed collection run"
        );
        Ok(aggregate)
    }

    /// Run one request with the matching strategy
    pub async fn dispatch(&self, request: PaginationRequest) -> Result<Vec<Record>> {
        let requester = self.requester.as_ref();
        match request {
            PaginationRequest::CursorLink(CursorLinkSource::Embedded(initial)) => {
                self.page_walker.collect(requester, initial).await
            }
            PaginationRequest::CursorLink(CursorLinkSource::Path { path, query }) => {
                self.page_walker.collect_from(requester, &path, &query).await
            }
            PaginationRequest::BatchFanOut(fan_out) => {
                self.fan_out
                    .collect(
                        requester,
                        &fan_out.path,
                        &fan_out.query,
                        fan_out.total,
                        fan_out.offset,
                    )
                    .await
            }
            PaginationRequest::CursorWalk(walk) => {
                self.cursor_walker.collect(requester, &walk).await
            }
        }
    }
}

/// Reject empty keys, duplicate keys and keys shadowing the base entry
fn validate_keys(base: Option<&BaseSeed>, queries: &[NamedSubQuery]) -> Result<()> {
    let mut seen = HashSet::new();
    if let Some(base) = base {
        if base.key.trim().is_empty() {
            return Err(Error::config("base entry key is empty"));
        }
        seen.insert(base.key.as_str());
    }

    for query in queries {
        if query.key.trim().is_empty() {
            return Err(Error::config("sub-query key is empty"));
        }
        if !seen.insert(query.key.as_str()) {
            return Err(Error::config(format!(
                "duplicate sub-query key '{}'",
                query.key
            )));
        }
    }
    Ok(())
}
