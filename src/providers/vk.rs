//! VK API 5.45
//!
//! Every answer is wrapped in `response`; collections are `{count, items}`
//! pages fetched with `offset`/`count`. User crawls take known totals from
//! the profile's `counters`; anything without a counter is probed first.

use crate::auth::{AuthRule, ProviderBinding};
use crate::engine::{AggregateResult, BaseSeed, CollectionOrchestrator, NamedSubQuery};
use crate::error::{Error, Result};
use crate::http::RequestConfig;
use crate::pagination::{EnvelopeLayout, FanOutRequest};
use serde_json::Value;
use tracing::info;

/// Default API root
pub const BASE_URL: &str = "https://api.vk.com/method/";

/// API version sent with every request
pub const API_VERSION: &str = "5.45";

/// Key of the profile in the aggregate
pub const PROFILE_KEY: &str = "profile";

/// Profile fields requested from `users.get`
pub const USER_FIELDS: [&str; 38] = [
    "sex",
    "bdate",
    "city",
    "country",
    "home_town",
    "photo_max",
    "photo_max_orig",
    "online",
    "domain",
    "has_mobile",
    "contacts",
    "site",
    "education",
    "universities",
    "schools",
    "status",
    "last_seen",
    "counters",
    "occupation",
    "nickname",
    "relatives",
    "relation",
    "personal",
    "connections",
    "exports",
    "screen_name",
    "maiden_name",
    "crop_photo",
    "timezone",
    "activities",
    "interests",
    "music",
    "movies",
    "tv",
    "books",
    "games",
    "about",
    "quotes",
];

/// VK binding: token and version in the query, payload under `response`
pub fn binding() -> ProviderBinding {
    ProviderBinding::new("vkontakte", BASE_URL)
        .with_auth(AuthRule::query("access_token"))
        .with_query("v", API_VERSION)
        .with_unwrap_path("response")
        .with_layout(EnvelopeLayout::items("items").with_total("count"))
}

/// Crawl a user profile and its collections.
///
/// The aggregate holds the profile under `profile` next to `friends`,
/// `groups`, `photos`, `audios`, `wall`, `videos` and `notes`.
pub async fn crawl_user(
    orchestrator: &CollectionOrchestrator,
    user_id: &str,
) -> Result<AggregateResult> {
    let requester = orchestrator.requester();
    let request = RequestConfig::new()
        .query("user_id", user_id)
        .query("fields", USER_FIELDS.join(","));
    let users = requester.send_raw("users.get", request).await?;
    let profile = users.get(0).cloned().ok_or_else(|| {
        Error::protocol(format!(
            "[{}] users.get returned no profile for '{user_id}'",
            requester.provider()
        ))
    })?;
    info!(provider = requester.provider(), user_id, "Fetched profile");

    let total = |name: &str| counter(&profile, name);
    let queries = vec![
        NamedSubQuery::new(
            "friends",
            FanOutRequest::new("friends.get", total("friends")).with_param("user_id", user_id),
        ),
        NamedSubQuery::new(
            "groups",
            FanOutRequest::new("groups.get", total("groups"))
                .with_param("user_id", user_id)
                .with_param("extended", "1"),
        ),
        NamedSubQuery::new(
            "photos",
            FanOutRequest::new("photos.getAll", total("photos"))
                .with_param("owner_id", user_id)
                .with_param("extended", "1"),
        ),
        NamedSubQuery::new(
            "audios",
            FanOutRequest::new("audio.get", total("audios")).with_param("owner_id", user_id),
        ),
        NamedSubQuery::new(
            "wall",
            FanOutRequest::new("wall.get", None)
                .with_param("owner_id", user_id)
                .with_param("filter", "owner"),
        ),
        NamedSubQuery::new(
            "videos",
            FanOutRequest::new("video.get", total("videos")).with_param("owner_id", user_id),
        ),
        NamedSubQuery::new(
            "notes",
            FanOutRequest::new("notes.get", total("notes")).with_param("user_id", user_id),
        ),
    ];

    orchestrator
        .run(Some(BaseSeed::new(PROFILE_KEY, profile)), queries)
        .await
}

/// Crawl a community's topics, wall, photo comments and videos.
///
/// Communities are addressed by their negated id. `topics_total` comes from
/// the community's own counters when the caller has them; everything else is
/// probed.
pub async fn crawl_group(
    orchestrator: &CollectionOrchestrator,
    group_id: u64,
    topics_total: Option<u64>,
) -> Result<AggregateResult> {
    let owner = format!("-{group_id}");
    let queries = vec![
        NamedSubQuery::new(
            "topics",
            FanOutRequest::new("board.getTopics", topics_total).with_param("group_id", &owner),
        ),
        NamedSubQuery::new(
            "wall",
            FanOutRequest::new("wall.get", None).with_param("group_id", &owner),
        ),
        NamedSubQuery::new(
            "photoComments",
            FanOutRequest::new("photos.getAllComments", None).with_param("owner_id", &owner),
        ),
        NamedSubQuery::new(
            "videos",
            FanOutRequest::new("video.get", None).with_param("owner_id", &owner),
        ),
    ];

    orchestrator.run(None, queries).await
}

/// A profile counter; absent or malformed counters are unknown totals
fn counter(profile: &Value, name: &str) -> Option<u64> {
    profile
        .get("counters")
        .and_then(|counters| counters.get(name))
        .and_then(Value::as_u64)
}
