//! Built-in provider crawls
//!
//! Each provider has a binding (where to send requests and how to read the
//! answers) and a crawl that maps one account onto named sub-queries.
//!
//! | Provider  | Auth                          | Pagination             |
//! |-----------|-------------------------------|------------------------|
//! | facebook  | `access_token` query          | cursor links           |
//! | vk        | `access_token` + `v` query    | offset/count fan-out   |
//! | twitter   | bearer header                 | `max_id` cursor walk   |
//! | linkedin  | bearer header + `format=json` | single request         |

pub mod facebook;
pub mod linkedin;
pub mod twitter;
pub mod vk;

use crate::auth::ProviderBinding;
use crate::engine::AggregateResult;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Supported providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Facebook Graph API v2.5
    #[serde(alias = "fb")]
    Facebook,
    /// VK API 5.45
    #[serde(alias = "vkontakte")]
    Vk,
    /// Twitter REST API 1.1
    #[serde(alias = "tw")]
    Twitter,
    /// LinkedIn REST API v1
    #[serde(alias = "li")]
    Linkedin,
}

impl Provider {
    /// Every provider, in catalogue order
    pub fn all() -> [Provider; 4] {
        [
            Provider::Facebook,
            Provider::Vk,
            Provider::Twitter,
            Provider::Linkedin,
        ]
    }

    /// Primary name
    pub fn name(self) -> &'static str {
        match self {
            Provider::Facebook => "facebook",
            Provider::Vk => "vk",
            Provider::Twitter => "twitter",
            Provider::Linkedin => "linkedin",
        }
    }

    /// Built-in binding
    pub fn binding(self) -> ProviderBinding {
        match self {
            Provider::Facebook => facebook::binding(),
            Provider::Vk => vk::binding(),
            Provider::Twitter => twitter::binding(),
            Provider::Linkedin => linkedin::binding(),
        }
    }

    /// Shape an aggregate the way the provider's consumers expect it.
    ///
    /// Facebook gets its connections written back into the profile, Twitter
    /// is the plain tweet list, LinkedIn the bare profile and VK the keyed
    /// object with `profile` next to the collections.
    pub fn render(self, aggregate: AggregateResult) -> Value {
        match self {
            Provider::Facebook => aggregate.into_merged_base(),
            Provider::Twitter => {
                let (_, mut collections) = aggregate.into_parts();
                Value::Array(collections.remove(twitter::TWEETS_KEY).unwrap_or_default())
            }
            Provider::Linkedin => {
                let (base, _) = aggregate.into_parts();
                base.map_or(Value::Null, |seed| seed.value)
            }
            Provider::Vk => aggregate.into_value(),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "facebook" | "fb" => Ok(Provider::Facebook),
            "vk" | "vkontakte" => Ok(Provider::Vk),
            "twitter" | "tw" => Ok(Provider::Twitter),
            "linkedin" | "li" => Ok(Provider::Linkedin),
            other => {
                let known: Vec<_> = Provider::all().iter().map(|p| p.name()).collect();
                Err(Error::config(format!(
                    "Unknown provider '{other}'. Built-in providers: {}",
                    known.join(", ")
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::BaseSeed;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use test_case::test_case;

    #[test_case("facebook", Provider::Facebook)]
    #[test_case("FB", Provider::Facebook)]
    #[test_case("vkontakte", Provider::Vk)]
    #[test_case(" vk ", Provider::Vk)]
    #[test_case("twitter", Provider::Twitter)]
    #[test_case("li", Provider::Linkedin)]
    fn test_parse_provider(input: &str, expected: Provider) {
        assert_eq!(input.parse::<Provider>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_provider() {
        let err = "myspace".parse::<Provider>().unwrap_err();
        assert!(err.to_string().contains("facebook, vk, twitter, linkedin"));
    }

    #[test]
    fn test_display_round_trips() {
        for provider in Provider::all() {
            assert_eq!(provider.to_string().parse::<Provider>().unwrap(), provider);
        }
    }

    #[test]
    fn test_binding_tags() {
        assert_eq!(Provider::Facebook.binding().tag, "facebook");
        assert_eq!(Provider::Vk.binding().tag, "vkontakte");
        assert_eq!(Provider::Twitter.binding().tag, "twitter");
        assert_eq!(Provider::Linkedin.binding().tag, "linkedin");
    }

    #[test]
    fn test_serde_names() {
        let parsed: Vec<Provider> = serde_yaml::from_str("[facebook, vkontakte, tw, linkedin]").unwrap();
        assert_eq!(parsed, Provider::all().to_vec());
        assert_eq!(serde_json::to_value(Provider::Vk).unwrap(), json!("vk"));
    }

    #[test]
    fn test_render_shapes() {
        let mut fb = AggregateResult::new(Some(BaseSeed::new("profile", json!({"id": "1"}))));
        fb.insert("likes".to_string(), vec![json!({"id": "l"})]);
        assert_eq!(
            Provider::Facebook.render(fb),
            json!({"id": "1", "likes": [{"id": "l"}]})
        );

        let mut tw = AggregateResult::new(None);
        tw.insert(twitter::TWEETS_KEY.to_string(), vec![json!({"id_str": "9"})]);
        assert_eq!(Provider::Twitter.render(tw), json!([{"id_str": "9"}]));

        let li = AggregateResult::new(Some(BaseSeed::new("profile", json!({"id": "x"}))));
        assert_eq!(Provider::Linkedin.render(li), json!({"id": "x"}));

        let mut vk = AggregateResult::new(Some(BaseSeed::new("profile", json!({"id": 1}))));
        vk.insert("notes".to_string(), vec![]);
        assert_eq!(
            Provider::Vk.render(vk),
            json!({"profile": {"id": 1}, "notes": []})
        );
    }
}
