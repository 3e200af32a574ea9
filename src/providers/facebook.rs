//! Facebook Graph API v2.5
//!
//! One `me?fields=...` request returns the profile with the first page of
//! every connection embedded. Each connection is then walked through its
//! `paging.next` links and written back over the embedded page.

use crate::auth::{AuthRule, ProviderBinding};
use crate::engine::{AggregateResult, BaseSeed, CollectionOrchestrator, NamedSubQuery};
use crate::error::Result;
use crate::http::RequestConfig;
use crate::pagination::{EnvelopeLayout, PageEnvelope, PaginationRequest};
use tracing::info;

/// Default API root
pub const BASE_URL: &str = "https://graph.facebook.com/v2.5/";

/// Profile fields requested from `me`, with nested connection selections
pub const FIELDS: &str = "
    id, name, first_name, last_name, middle_name, name_format, about,
    age_range, bio, birthday, context, cover, devices, education, gender,
    hometown, inspirational_people, link, locale, meeting_for,
    albums {
        count, id, description, event, from, link, created_time, backdated_time,
        photos {
            id, from, link, picture, width, height, place,
            comments { id, from, message }
        }
    },
    picture { width, height, url, is_silhouette },
    interested_in, is_verified, political, quotes, relationship_status,
    religion, significant_other, sports, updated_time, verified, work,
    books { about, id, name },
    family { id, name, relationship, updated_time },
    friends { name, id },
    movies { id, name },
    music { id, name },
    photos { id, name, comments { id, from }, album },
    videos { id, description, comments { id, from }, status },
    feed { id, name, description, updated_time, comments { id, from }, status_type },
    posts { id, name, description, updated_time, comments { id, from }, status_type },
    languages, favorite_athletes, favorite_teams,
    television { id, name, description },
    events {
        id, name, description, start_time, end_time, updated_time,
        comments { id, from, message, parent, user_likes, comments { id, from } },
        type, category
    },
    likes { id, about, description, name, posts { id, from, updated_time, message, name } }
";

/// Connections walked to completion
pub const CONNECTIONS: [&str; 13] = [
    "albums",
    "books",
    "family",
    "friends",
    "movies",
    "music",
    "photos",
    "videos",
    "feed",
    "posts",
    "television",
    "events",
    "likes",
];

/// Key of the profile in the aggregate
pub const PROFILE_KEY: &str = "profile";

/// Graph API binding: token in `access_token`, errors under `error`
pub fn binding() -> ProviderBinding {
    ProviderBinding::new("facebook", BASE_URL)
        .with_auth(AuthRule::query("access_token"))
        .with_layout(EnvelopeLayout::items("data").with_next_cursor("paging.next"))
}

/// The `fields` parameter with all whitespace removed
pub fn fields() -> String {
    FIELDS.split_whitespace().collect()
}

/// Crawl the token owner's profile and every connection.
///
/// A connection missing from the profile comes back as an empty list.
pub async fn crawl(orchestrator: &CollectionOrchestrator) -> Result<AggregateResult> {
    let requester = orchestrator.requester();
    let profile = requester
        .send_raw("me", RequestConfig::new().query("fields", fields()))
        .await?;
    info!(provider = requester.provider(), "Fetched profile");

    let layout = &requester.binding().layout;
    let mut queries = Vec::with_capacity(CONNECTIONS.len());
    for connection in CONNECTIONS {
        let initial = PageEnvelope::from_optional(profile.get(connection), layout)?;
        queries.push(NamedSubQuery::new(
            connection,
            PaginationRequest::embedded(initial),
        ));
    }

    orchestrator
        .run(Some(BaseSeed::new(PROFILE_KEY, profile)), queries)
        .await
}
