//! Pagination strategy implementations
//!
//! Each strategy turns one request into the complete, ordered record list.

use super::types::{CursorWalkRequest, PageEnvelope};
use crate::error::{Error, Result};
use crate::http::{AuthenticatedRequester, RequestConfig};
use crate::types::{lookup_path, scalar_to_string, Record, StringMap};
use futures::future::try_join_all;
use std::cmp::{max, min, Ordering};
use tokio::sync::Semaphore;
use tracing::debug;

/// Default guard on the number of cursor links followed
pub const DEFAULT_MAX_PAGES: usize = 10_000;

/// Default guard on cursor-walk iterations
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

// ============================================================================
// Cursor-Link Pagination
// ============================================================================

/// Follows next-page links until a page carries none (e.g. Graph API `paging.next`)
#[derive(Debug, Clone)]
pub struct PageWalker {
    /// Maximum number of links followed before giving up
    pub max_pages: usize,
}

impl Default for PageWalker {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

impl PageWalker {
    /// Create a walker with a custom page guard
    pub fn new(max_pages: usize) -> Self {
        Self { max_pages }
    }

    /// Collect every item reachable from `initial`.
    ///
    /// Cursor presence, not item count, decides whether another page is
    /// fetched: an empty page with a cursor is still followed.
    pub async fn collect(
        &self,
        requester: &AuthenticatedRequester,
        initial: Option<PageEnvelope>,
    ) -> Result<Vec<Record>> {
        let Some(first) = initial else {
            return Ok(Vec::new());
        };

        let mut items = first.items;
        let mut cursor = first.next_cursor;
        let mut followed = 0usize;

        while let Some(link) = cursor.take() {
            if followed >= self.max_pages {
                return Err(Error::protocol(format!(
                    "[{}] still paging after {} links",
                    requester.provider(),
                    self.max_pages
                )));
            }

            let page = requester.send(&link, RequestConfig::new()).await?;
            followed += 1;
            debug!(
                provider = requester.provider(),
                page = followed,
                items = page.items.len(),
                "Fetched linked page"
            );

            if page.next_cursor.as_deref() == Some(link.as_str()) {
                return Err(Error::protocol(format!(
                    "[{}] page links back to itself: {link}",
                    requester.provider()
                )));
            }

            items.extend(page.items);
            cursor = page.next_cursor;
        }

        Ok(items)
    }

    /// Fetch the first page from `path`, then follow its links
    pub async fn collect_from(
        &self,
        requester: &AuthenticatedRequester,
        path: &str,
        query: &StringMap,
    ) -> Result<Vec<Record>> {
        let first = requester
            .send(path, RequestConfig::new().queries(query))
            .await?;
        self.collect(requester, Some(first)).await
    }
}

// ============================================================================
// Offset/Count Batch Fan-Out
// ============================================================================

/// One planned batch of a fan-out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSpec {
    /// Position in the merged output
    pub index: usize,
    /// Offset requested
    pub offset: u64,
    /// Count requested
    pub count: u64,
}

/// Split `[offset, total)` into batches of at most `batch_size`.
///
/// Returns nothing when `total <= offset` or `batch_size` is zero.
pub fn plan_batches(total: u64, offset: u64, batch_size: u64) -> Vec<BatchSpec> {
    if total <= offset || batch_size == 0 {
        return Vec::new();
    }

    let remaining = total - offset;
    let steps = remaining.div_ceil(batch_size);
    (0..steps)
        .map(|i| BatchSpec {
            index: i as usize,
            offset: offset + batch_size * i,
            count: min(remaining - batch_size * i, batch_size),
        })
        .collect()
}

/// Offset/count pagination with total discovery (e.g. VK `count`/`items`)
#[derive(Debug, Clone)]
pub struct BatchFanOutFetcher {
    /// Items per batch
    pub batch_size: u64,
    /// Maximum batches in flight; `None` issues every batch at once
    pub max_concurrency: Option<usize>,
    /// Query parameter name for offset
    pub offset_param: String,
    /// Query parameter name for count
    pub count_param: String,
}

impl Default for BatchFanOutFetcher {
    fn default() -> Self {
        Self {
            batch_size: 100,
            max_concurrency: None,
            offset_param: "offset".to_string(),
            count_param: "count".to_string(),
        }
    }
}

impl BatchFanOutFetcher {
    /// Create a fetcher with the given batch size
    pub fn new(batch_size: u64) -> Self {
        Self {
            batch_size,
            ..Self::default()
        }
    }

    /// Cap the number of batches in flight
    #[must_use]
    pub fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = Some(limit);
        self
    }

    /// Use different offset/count parameter names
    #[must_use]
    pub fn with_params(mut self, offset_param: impl Into<String>, count_param: impl Into<String>) -> Self {
        self.offset_param = offset_param.into();
        self.count_param = count_param.into();
        self
    }

    /// Collect the whole collection at `path`.
    ///
    /// With an unknown total one probe request (at `offset`) discovers it;
    /// its items come first and the fan-out continues one batch further on.
    /// Batches are merged by offset, not by arrival.
    pub async fn collect(
        &self,
        requester: &AuthenticatedRequester,
        path: &str,
        query: &StringMap,
        total: Option<u64>,
        offset: u64,
    ) -> Result<Vec<Record>> {
        if self.batch_size == 0 {
            return Err(Error::config("batch size must be at least 1"));
        }

        let mut items = Vec::new();
        let (total, offset) = match total {
            Some(total) => (total, offset),
            None => {
                let probe = self
                    .fetch_batch(requester, path, query, offset, self.batch_size)
                    .await?;
                let total = probe.total_count.ok_or_else(|| {
                    Error::protocol(format!(
                        "[{}] probe of '{path}' reported no total count",
                        requester.provider()
                    ))
                })?;
                debug!(
                    provider = requester.provider(),
                    path,
                    total,
                    "Discovered collection size"
                );
                items = probe.items;
                (total, offset + self.batch_size)
            }
        };

        let plan = plan_batches(total, offset, self.batch_size);
        if plan.is_empty() {
            return Ok(items);
        }

        debug!(
            provider = requester.provider(),
            path,
            total,
            batches = plan.len(),
            "Fanning out"
        );

        let semaphore = self.max_concurrency.map(|limit| Semaphore::new(limit.max(1)));
        let batches = try_join_all(plan.iter().map(|batch| {
            let semaphore = semaphore.as_ref();
            async move {
                let _permit = match semaphore {
                    Some(semaphore) => Some(
                        semaphore
                            .acquire()
                            .await
                            .map_err(|e| Error::Other(e.to_string()))?,
                    ),
                    None => None,
                };
                let page = self
                    .fetch_batch(requester, path, query, batch.offset, batch.count)
                    .await?;
                Ok::<_, Error>(page.items)
            }
        }))
        .await?;

        // try_join_all yields results in input order, i.e. by batch index
        items.extend(batches.into_iter().flatten());
        Ok(items)
    }

    async fn fetch_batch(
        &self,
        requester: &AuthenticatedRequester,
        path: &str,
        query: &StringMap,
        offset: u64,
        count: u64,
    ) -> Result<PageEnvelope> {
        let request = RequestConfig::new()
            .queries(query)
            .query(&self.offset_param, offset.to_string())
            .query(&self.count_param, count.to_string());
        requester.send(path, request).await
    }
}

// ============================================================================
// Bounded Cursor Walk
// ============================================================================

/// Walks a reverse-chronological collection by identifier (e.g. `max_id`)
#[derive(Debug, Clone)]
pub struct BoundedCursorWalker {
    /// Maximum number of requests before giving up
    pub max_iterations: usize,
}

impl Default for BoundedCursorWalker {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl BoundedCursorWalker {
    /// Create a walker with a custom iteration guard
    pub fn new(max_iterations: usize) -> Self {
        Self { max_iterations }
    }

    /// Collect until `target_count` items are in hand or a batch comes back empty.
    ///
    /// Each request asks for `max(batch_size, target_count - processed)` items,
    /// so the last round usually finishes the walk. The output is not trimmed
    /// to `target_count`.
    pub async fn collect(
        &self,
        requester: &AuthenticatedRequester,
        request: &CursorWalkRequest,
    ) -> Result<Vec<Record>> {
        let mut result = Vec::new();
        let mut processed = 0u64;
        let mut max_cursor: Option<String> = None;
        let mut iterations = 0usize;

        while processed < request.target_count {
            if iterations >= self.max_iterations {
                return Err(Error::protocol(format!(
                    "[{}] cursor walk exceeded {} requests",
                    requester.provider(),
                    self.max_iterations
                )));
            }
            iterations += 1;

            let count = max(request.batch_size, request.target_count - processed);
            let mut config = RequestConfig::new()
                .queries(&request.query)
                .query(&request.count_param, count.to_string());
            if let Some(cursor) = &max_cursor {
                config = config.query(&request.cursor_param, cursor.clone());
            }

            let page = requester.send(&request.path, config).await?;
            let Some(last) = page.items.last() else {
                debug!(provider = requester.provider(), processed, "Cursor walk exhausted");
                break;
            };

            let next = lookup_path(last, &request.cursor_field)
                .and_then(scalar_to_string)
                .ok_or_else(|| {
                    Error::protocol(format!(
                        "[{}] item has no '{}' to continue from",
                        requester.provider(),
                        request.cursor_field
                    ))
                })?;
            if let Some(previous) = &max_cursor {
                if !strictly_before(&next, previous) {
                    return Err(Error::protocol(format!(
                        "[{}] cursor did not decrease: {previous} -> {next}",
                        requester.provider()
                    )));
                }
            }

            processed += page.items.len() as u64;
            max_cursor = Some(next);
            result.extend(page.items);
        }

        Ok(result)
    }
}

/// Whether `next` sorts strictly before `previous`.
///
/// Numeric identifiers compare as numbers; anything else only has to differ.
fn strictly_before(next: &str, previous: &str) -> bool {
    match (next.parse::<u128>(), previous.parse::<u128>()) {
        (Ok(next), Ok(previous)) => next.cmp(&previous) == Ordering::Less,
        _ => next != previous,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strictly_before() {
        assert!(strictly_before("99", "100"));
        assert!(!strictly_before("100", "100"));
        assert!(!strictly_before("101", "100"));
        assert!(strictly_before("abc", "abd"));
        assert!(!strictly_before("abc", "abc"));
    }
}
