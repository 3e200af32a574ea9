//! Top-level crawler
//!
//! Wires a transport, the configuration and the provider catalogue together:
//! one call per account, one `AggregateResult` back.

use crate::auth::ProviderBinding;
use crate::config::CrawlConfig;
use crate::engine::{AggregateResult, CollectionOrchestrator};
use crate::error::{Error, Result};
use crate::http::{AuthenticatedRequester, HttpClient, Transport};
use crate::providers::{self, Provider};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Credential and subject of one crawl
#[derive(Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    /// Access token
    pub token: String,
    /// Account id; required by VK and Twitter, ignored by token-owner crawls
    pub subject_id: Option<String>,
}

impl CrawlTarget {
    /// Target the token owner
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            subject_id: None,
        }
    }

    /// Target a specific account
    #[must_use]
    pub fn with_subject(mut self, subject_id: impl Into<String>) -> Self {
        self.subject_id = Some(subject_id.into());
        self
    }
}

impl std::fmt::Debug for CrawlTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrawlTarget")
            .field("token", &"<redacted>")
            .field("subject_id", &self.subject_id)
            .finish()
    }
}

/// Runs provider crawls over a shared transport
#[derive(Clone)]
pub struct Crawler {
    transport: Arc<dyn Transport>,
    config: CrawlConfig,
}

impl Crawler {
    /// Create a crawler backed by `HttpClient`
    pub fn new(config: CrawlConfig) -> Result<Self> {
        config.validate()?;
        let client = HttpClient::with_config(config.http_client_config())?;
        Ok(Self {
            transport: Arc::new(client),
            config,
        })
    }

    /// Create a crawler over any transport
    pub fn with_transport(transport: Arc<dyn Transport>, config: CrawlConfig) -> Self {
        Self { transport, config }
    }

    /// The configuration in use
    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// The binding for `provider` with configured overrides applied
    pub fn binding(&self, provider: Provider) -> ProviderBinding {
        let binding = provider.binding();
        match self.config.base_url(provider) {
            Some(base_url) => binding.with_base_url(base_url),
            None => binding,
        }
    }

    /// A requester for `provider` using `token`
    pub fn requester(&self, provider: Provider, token: &str) -> AuthenticatedRequester {
        AuthenticatedRequester::new(self.transport.clone(), self.binding(provider), token)
    }

    /// An orchestrator over `requester` with the configured strategies
    pub fn orchestrator(&self, requester: AuthenticatedRequester) -> CollectionOrchestrator {
        CollectionOrchestrator::new(Arc::new(requester))
            .with_page_walker(self.config.page_walker())
            .with_fan_out(self.config.fan_out())
            .with_cursor_walker(self.config.cursor_walker())
    }

    /// Crawl one account
    pub async fn crawl(&self, provider: Provider, target: &CrawlTarget) -> Result<AggregateResult> {
        let start = Instant::now();
        let subject = target.subject_id.as_deref();
        info!(provider = %provider, subject = subject.unwrap_or("me"), "Starting crawl");

        let orchestrator = self.orchestrator(self.requester(provider, &target.token));
        let aggregate = match provider {
            Provider::Facebook => providers::facebook::crawl(&orchestrator).await?,
            Provider::Linkedin => providers::linkedin::crawl(&orchestrator).await?,
            Provider::Vk => {
                let user_id = required_subject(provider, subject)?;
                providers::vk::crawl_user(&orchestrator, user_id).await?
            }
            Provider::Twitter => {
                let user_id = required_subject(provider, subject)?;
                let timeline = &self.config.timeline;
                providers::twitter::crawl(
                    &orchestrator,
                    user_id,
                    timeline.batch_size,
                    timeline.target_count,
                )
                .await?
            }
        };

        info!(
            provider = %provider,
            collections = aggregate.len(),
            records = aggregate.total_records(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Completed crawl"
        );
        Ok(aggregate)
    }

    /// Crawl one account and shape the result the provider's way
    pub async fn crawl_value(&self, provider: Provider, target: &CrawlTarget) -> Result<Value> {
        let aggregate = self.crawl(provider, target).await?;
        Ok(provider.render(aggregate))
    }

    /// Crawl a VK community
    pub async fn crawl_vk_group(
        &self,
        token: &str,
        group_id: u64,
        topics_total: Option<u64>,
    ) -> Result<AggregateResult> {
        let orchestrator = self.orchestrator(self.requester(Provider::Vk, token));
        providers::vk::crawl_group(&orchestrator, group_id, topics_total).await
    }
}

fn required_subject(provider: Provider, subject: Option<&str>) -> Result<&str> {
    subject.ok_or_else(|| Error::config(format!("{provider} crawl needs a subject id")))
}

impl std::fmt::Debug for Crawler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Crawler")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
