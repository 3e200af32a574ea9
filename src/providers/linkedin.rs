//! LinkedIn REST API v1
//!
//! The whole profile comes back from one field-selector request.

use crate::auth::{AuthRule, ProviderBinding};
use crate::engine::{AggregateResult, BaseSeed, CollectionOrchestrator};
use crate::error::Result;
use crate::http::RequestConfig;

/// Default API root
pub const BASE_URL: &str = "https://api.linkedin.com/v1/";

/// Key of the profile in the aggregate
pub const PROFILE_KEY: &str = "profile";

/// Profile fields selected on `people/~`
pub const FIELDS: [&str; 45] = [
    // basic profile
    "id",
    "first-name",
    "last-name",
    "maiden-name",
    "formatted-name",
    "phonetic-first-name",
    "phonetic-last-name",
    "formatted-phonetic-name",
    "headline",
    "location",
    "industry",
    "current-share",
    "num-connections",
    "num-connections-capped",
    "summary",
    "specialties",
    "positions",
    "picture-url",
    "picture-urls",
    "site-standard-profile-request",
    "api-standard-profile-request",
    "public-profile-url",
    // email
    "email_address",
    // full profile
    "proposal-comments",
    "associations",
    "interests",
    "publications",
    "patents",
    "languages",
    "skills",
    "certifications",
    "educations",
    "courses",
    "volunteer",
    "three-current-positions",
    "three-past-positions",
    "num-recommenders",
    "recommendations-received",
    "following",
    "job-bookmarks",
    "suggestions",
    "date-of-birth",
    "member-url-resources",
    "related-profile-views",
    "honors-awards",
];

/// LinkedIn binding: bearer token, JSON format forced by query and header
pub fn binding() -> ProviderBinding {
    ProviderBinding::new("linkedin", BASE_URL)
        .with_auth(AuthRule::Bearer)
        .with_query("format", "json")
        .with_header("x-li-format", "json")
}

/// `people/~:(id,first-name,...)`
pub fn profile_path() -> String {
    format!("people/~:({})", FIELDS.join(","))
}

/// Fetch the token owner's profile; the aggregate has no sub-collections
pub async fn crawl(orchestrator: &CollectionOrchestrator) -> Result<AggregateResult> {
    let profile = orchestrator
        .requester()
        .send_raw(&profile_path(), RequestConfig::new())
        .await?;
    orchestrator
        .run(Some(BaseSeed::new(PROFILE_KEY, profile)), Vec::new())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedTransport;
    use crate::AuthenticatedRequester;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_profile_path() {
        let path = profile_path();
        assert!(path.starts_with("people/~:(id,first-name,last-name,"));
        assert!(path.ends_with(",honors-awards)"));
    }

    #[tokio::test]
    async fn test_crawl_profile() {
        let transport = ScriptedTransport::respond(|url, req| {
            assert!(url.starts_with("https://api.linkedin.com/v1/people/~:(id,"));
            assert_eq!(req.query["format"], "json");
            assert_eq!(req.headers["x-li-format"], "json");
            assert_eq!(req.headers["Authorization"], "Bearer li-token");
            Ok(json!({"id": "abc", "firstName": "Ann", "numConnections": 12}))
        });
        let requester = AuthenticatedRequester::new(transport.clone(), binding(), "li-token");
        let orchestrator = CollectionOrchestrator::new(Arc::new(requester));

        let aggregate = crawl(&orchestrator).await.unwrap();

        assert!(aggregate.is_empty());
        assert_eq!(aggregate.base().unwrap().value["firstName"], "Ann");
        assert_eq!(transport.call_count(), 1);
    }
}
