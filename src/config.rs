//! Crawl configuration
//!
//! Everything tunable about a crawl, loadable from YAML. All sections are
//! optional; missing values fall back to the provider defaults.
//!
//! ```yaml
//! http:
//!   timeout_seconds: 20
//!   max_retries: 2
//!   retry_backoff:
//!     type: linear
//!     initial_ms: 250
//! pagination:
//!   batch_size: 100
//!   max_concurrency: 4
//! timeline:
//!   batch_size: 200
//!   target_count: 1000
//! providers:
//!   vk:
//!     base_url: http://localhost:8080/method/
//! ```

use crate::error::{Error, Result, ResultExt};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::pagination::{
    BatchFanOutFetcher, BoundedCursorWalker, PageWalker, DEFAULT_MAX_ITERATIONS,
    DEFAULT_MAX_PAGES,
};
use crate::providers::Provider;
use crate::types::BackoffType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete crawl configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// HTTP transport settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Pagination strategy settings
    #[serde(default)]
    pub pagination: PaginationConfig,

    /// Tweet timeline walk settings
    #[serde(default)]
    pub timeline: TimelineConfig,

    /// Per-provider overrides
    #[serde(default)]
    pub providers: HashMap<Provider, ProviderOverride>,
}

impl CrawlConfig {
    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Failed to parse crawl config YAML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read crawl config '{}'", path.display()))?;
        Self::from_yaml_str(&content)
    }

    /// Reject values no strategy can run with
    pub fn validate(&self) -> Result<()> {
        if self.pagination.batch_size == 0 {
            return Err(Error::config("pagination.batch_size must be at least 1"));
        }
        if self.pagination.max_concurrency == Some(0) {
            return Err(Error::config("pagination.max_concurrency must be at least 1"));
        }
        if self.timeline.batch_size == 0 {
            return Err(Error::config("timeline.batch_size must be at least 1"));
        }
        for (provider, overrides) in &self.providers {
            if let Some(base_url) = &overrides.base_url {
                url::Url::parse(base_url).map_err(|e| {
                    Error::config(format!("Invalid base_url for {provider}: {e}"))
                })?;
            }
        }
        Ok(())
    }

    /// Transport settings for `HttpClient`
    pub fn http_client_config(&self) -> HttpClientConfig {
        let http = &self.http;
        let mut builder = HttpClientConfig::builder()
            .timeout(Duration::from_secs(http.timeout_seconds))
            .max_retries(http.max_retries)
            .backoff(
                http.retry_backoff.backoff_type,
                Duration::from_millis(http.retry_backoff.initial_ms),
                Duration::from_millis(http.retry_backoff.max_ms),
            );
        builder = match &http.rate_limit {
            Some(rate_limit) => builder.rate_limit(rate_limit.clone()),
            None => builder.no_rate_limit(),
        };
        if let Some(agent) = &http.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        builder.build()
    }

    /// Cursor-link walker with the configured page guard
    pub fn page_walker(&self) -> PageWalker {
        PageWalker::new(self.pagination.max_pages)
    }

    /// Batch fan-out fetcher with the configured batch size and width
    pub fn fan_out(&self) -> BatchFanOutFetcher {
        let fetcher = BatchFanOutFetcher::new(self.pagination.batch_size);
        match self.pagination.max_concurrency {
            Some(limit) => fetcher.with_max_concurrency(limit),
            None => fetcher,
        }
    }

    /// Cursor walker with the configured iteration guard
    pub fn cursor_walker(&self) -> BoundedCursorWalker {
        BoundedCursorWalker::new(self.pagination.max_iterations)
    }

    /// Base URL override for `provider`, if configured
    pub fn base_url(&self, provider: Provider) -> Option<&str> {
        self.providers
            .get(&provider)
            .and_then(|o| o.base_url.as_deref())
    }

    /// Point `provider` at a different base URL
    #[must_use]
    pub fn with_base_url(mut self, provider: Provider, base_url: impl Into<String>) -> Self {
        self.providers.entry(provider).or_default().base_url = Some(base_url.into());
        self
    }
}

// ============================================================================
// HTTP Config
// ============================================================================

/// HTTP transport configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Maximum number of retries per request
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Retry backoff
    #[serde(default)]
    pub retry_backoff: BackoffConfig,

    /// Token bucket; `null` disables rate limiting
    #[serde(default = "default_rate_limit")]
    pub rate_limit: Option<RateLimiterConfig>,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            retry_backoff: BackoffConfig::default(),
            rate_limit: default_rate_limit(),
            user_agent: None,
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

#[allow(clippy::unnecessary_wraps)]
fn default_rate_limit() -> Option<RateLimiterConfig> {
    Some(RateLimiterConfig::default())
}

/// Backoff configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Type of backoff
    #[serde(rename = "type", default)]
    pub backoff_type: BackoffType,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_ms")]
    pub initial_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_ms")]
    pub max_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            backoff_type: BackoffType::Exponential,
            initial_ms: default_initial_ms(),
            max_ms: default_max_ms(),
        }
    }
}

fn default_initial_ms() -> u64 {
    100
}

fn default_max_ms() -> u64 {
    60000
}

// ============================================================================
// Pagination Config
// ============================================================================

/// Pagination strategy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Items per fan-out batch
    #[serde(default = "default_batch_size")]
    pub batch_size: u64,

    /// Fan-out batches in flight; `null` means unbounded
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: Option<usize>,

    /// Cursor links followed before giving up
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Cursor walk requests before giving up
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_concurrency: default_max_concurrency(),
            max_pages: default_max_pages(),
            max_iterations: default_max_iterations(),
        }
    }
}

fn default_batch_size() -> u64 {
    100
}

#[allow(clippy::unnecessary_wraps)]
fn default_max_concurrency() -> Option<usize> {
    Some(8)
}

fn default_max_pages() -> usize {
    DEFAULT_MAX_PAGES
}

fn default_max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}

/// Tweet timeline walk configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineConfig {
    /// Minimum tweets per request
    #[serde(default = "default_timeline_batch")]
    pub batch_size: u64,

    /// Tweets to collect
    #[serde(default = "default_timeline_target")]
    pub target_count: u64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            batch_size: default_timeline_batch(),
            target_count: default_timeline_target(),
        }
    }
}

fn default_timeline_batch() -> u64 {
    2
}

fn default_timeline_target() -> u64 {
    5
}

// ============================================================================
// Provider Overrides
// ============================================================================

/// Per-provider settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderOverride {
    /// Replaces the built-in base URL
    #[serde(default)]
    pub base_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = CrawlConfig::default();
        assert_eq!(config.http.timeout_seconds, 30);
        assert_eq!(config.http.max_retries, 3);
        assert_eq!(config.pagination.batch_size, 100);
        assert_eq!(config.pagination.max_concurrency, Some(8));
        assert_eq!(config.timeline.batch_size, 2);
        assert_eq!(config.timeline.target_count, 5);
        assert!(config.providers.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = CrawlConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, CrawlConfig::default());
    }

    #[test]
    fn test_parse_full_yaml() {
        let yaml = r"
http:
  timeout_seconds: 20
  max_retries: 1
  retry_backoff:
    type: linear
    initial_ms: 250
  rate_limit: null
  user_agent: crawler/2
pagination:
  batch_size: 50
  max_concurrency: null
  max_pages: 10
timeline:
  target_count: 200
providers:
  vk:
    base_url: http://localhost:8080/method/
";
        let config = CrawlConfig::from_yaml_str(yaml).unwrap();

        assert_eq!(config.http.timeout_seconds, 20);
        assert_eq!(config.http.retry_backoff.backoff_type, BackoffType::Linear);
        assert_eq!(config.http.retry_backoff.initial_ms, 250);
        assert_eq!(config.http.retry_backoff.max_ms, 60000);
        assert!(config.http.rate_limit.is_none());
        assert_eq!(config.pagination.batch_size, 50);
        assert_eq!(config.pagination.max_concurrency, None);
        assert_eq!(config.pagination.max_iterations, DEFAULT_MAX_ITERATIONS);
        assert_eq!(config.timeline.batch_size, 2);
        assert_eq!(config.timeline.target_count, 200);
        assert_eq!(
            config.base_url(Provider::Vk),
            Some("http://localhost:8080/method/")
        );
        assert_eq!(config.base_url(Provider::Twitter), None);
    }

    #[test]
    fn test_http_client_config() {
        let yaml = r"
http:
  timeout_seconds: 5
  max_retries: 0
  retry_backoff:
    type: constant
    initial_ms: 10
    max_ms: 20
  rate_limit:
    requests_per_second: 3
    burst_size: 1
  user_agent: crawler/2
";
        let http = CrawlConfig::from_yaml_str(yaml).unwrap().http_client_config();

        assert_eq!(http.timeout, Duration::from_secs(5));
        assert_eq!(http.max_retries, 0);
        assert_eq!(http.backoff_type, BackoffType::Constant);
        assert_eq!(http.initial_backoff, Duration::from_millis(10));
        assert_eq!(http.max_backoff, Duration::from_millis(20));
        assert_eq!(http.rate_limit, Some(RateLimiterConfig::new(3, 1)));
        assert_eq!(http.user_agent, "crawler/2");
    }

    #[test]
    fn test_strategy_builders() {
        let mut config = CrawlConfig::default();
        config.pagination.batch_size = 25;
        config.pagination.max_pages = 7;
        config.pagination.max_iterations = 9;

        let fan_out = config.fan_out();
        assert_eq!(fan_out.batch_size, 25);
        assert_eq!(fan_out.max_concurrency, Some(8));
        assert_eq!(config.page_walker().max_pages, 7);
        assert_eq!(config.cursor_walker().max_iterations, 9);

        config.pagination.max_concurrency = None;
        assert_eq!(config.fan_out().max_concurrency, None);
    }

    #[test]
    fn test_with_base_url() {
        let config = CrawlConfig::default().with_base_url(Provider::Facebook, "http://fb.local/");
        assert_eq!(config.base_url(Provider::Facebook), Some("http://fb.local/"));
    }

    #[test]
    fn test_validation_errors() {
        for yaml in [
            "pagination:\n  batch_size: 0\n",
            "pagination:\n  max_concurrency: 0\n",
            "timeline:\n  batch_size: 0\n",
            "providers:\n  twitter:\n    base_url: not a url\n",
        ] {
            let err = CrawlConfig::from_yaml_str(yaml).unwrap_err();
            assert!(matches!(err, Error::Config { .. }), "{yaml}: {err:?}");
        }
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let err = CrawlConfig::from_yaml_str("providers:\n  myspace: {}\n").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timeline:\n  target_count: 42").unwrap();

        let config = CrawlConfig::from_file(file.path()).unwrap();
        assert_eq!(config.timeline.target_count, 42);
    }

    #[test]
    fn test_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = CrawlConfig::from_file(dir.path().join("missing.yaml")).unwrap_err();
        assert!(err.to_string().contains("missing.yaml"));
    }
}
