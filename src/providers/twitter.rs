//! Twitter REST API 1.1
//!
//! The user timeline is a bare JSON array, newest first. Older tweets are
//! reached with `max_id` set to the last tweet's `id_str`.

use crate::auth::{AuthRule, ProviderBinding};
use crate::engine::{AggregateResult, CollectionOrchestrator, NamedSubQuery};
use crate::error::Result;
use crate::pagination::{CursorWalkRequest, EnvelopeLayout};

/// Default API root
pub const BASE_URL: &str = "https://api.twitter.com/1.1/";

/// Timeline endpoint
pub const TIMELINE_PATH: &str = "statuses/user_timeline.json";

/// Key of the tweet list in the aggregate
pub const TWEETS_KEY: &str = "tweets";

/// Twitter binding: bearer token, bare-array pages
pub fn binding() -> ProviderBinding {
    ProviderBinding::new("twitter", BASE_URL)
        .with_auth(AuthRule::Bearer)
        .with_layout(EnvelopeLayout::bare_array())
}

/// The timeline walk for one user
pub fn timeline_request(user_id: &str, batch_size: u64, target_count: u64) -> CursorWalkRequest {
    CursorWalkRequest::new(TIMELINE_PATH, batch_size, target_count).with_param("user_id", user_id)
}

/// Collect at least `target_count` tweets of a user (fewer if the timeline
/// runs out), stored under `tweets`
pub async fn crawl(
    orchestrator: &CollectionOrchestrator,
    user_id: &str,
    batch_size: u64,
    target_count: u64,
) -> Result<AggregateResult> {
    let query = NamedSubQuery::new(
        TWEETS_KEY,
        timeline_request(user_id, batch_size, target_count),
    );
    orchestrator.run(None, vec![query]).await
}
