//! Query DTOs for the proxy API
//!
//! Each route's query string, plus the cache key it derives from it.

use serde::Deserialize;

use crate::error::{ApiError, Result};
use crate::upstream::endpoints::ALL_COUNTRIES;

/// Returns the trimmed value or `MissingQuery(name)` when absent or blank.
fn required(value: &Option<String>, name: &str) -> Result<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::MissingQuery(name.to_string()))
}

/// Query for `GET /info/covid`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CovidQuery {
    pub country: Option<String>,
}

impl CovidQuery {
    /// Country code, or the worldwide key when none was given.
    pub fn cache_key(&self) -> String {
        self.country
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(ALL_COUNTRIES)
            .to_string()
    }
}

/// Query for `GET /info/reddit`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RedditQuery {
    pub sub: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Listing sorts reddit serves as `r/{sub}/{sort}.json`.
pub const REDDIT_SORTS: [&str; 5] = ["hot", "new", "top", "rising", "controversial"];

impl RedditQuery {
    /// `(subreddit, listing)`; listing defaults to `new` and must be one of
    /// [`REDDIT_SORTS`].
    pub fn validate(&self) -> Result<(String, String)> {
        let sub = required(&self.sub, "sub")?;
        let kind = match self.kind.as_deref().map(str::trim) {
            None | Some("") => "new".to_string(),
            Some(kind) => {
                let kind = kind.to_ascii_lowercase();
                if !REDDIT_SORTS.contains(&kind.as_str()) {
                    return Err(ApiError::InvalidQuery("type".to_string()));
                }
                kind
            }
        };
        Ok((sub, kind))
    }

    /// `sub_kind`. Sorts contain no `_`, so the last segment is always the sort.
    pub fn cache_key(sub: &str, kind: &str) -> String {
        format!("{sub}_{kind}")
    }
}

/// Query for `GET /info/npm`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NpmQuery {
    pub package: Option<String>,
}

impl NpmQuery {
    pub fn validate(&self) -> Result<String> {
        required(&self.package, "package")
    }
}

/// Query for `GET /socials/github`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GithubQuery {
    pub repo: Option<String>,
}

impl GithubQuery {
    pub fn validate(&self) -> Result<String> {
        required(&self.repo, "repo")
    }
}

/// Query for `GET /socials/steam`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SteamQuery {
    pub username: Option<String>,
}

impl SteamQuery {
    pub fn validate(&self) -> Result<String> {
        required(&self.username, "username")
    }
}

/// Query for `GET /socials/twitch`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TwitchQuery {
    pub username: Option<String>,
}

impl TwitchQuery {
    /// Twitch logins are lowercase, so `Shroud` and `shroud` share a key.
    pub fn validate(&self) -> Result<String> {
        required(&self.username, "username").map(|login| login.to_ascii_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_covid_key_defaults_to_all() {
        assert_eq!(CovidQuery::default().cache_key(), "/all");
        let blank = CovidQuery { country: Some("  ".into()) };
        assert_eq!(blank.cache_key(), "/all");
        let uk = CovidQuery { country: Some("uk".into()) };
        assert_eq!(uk.cache_key(), "uk");
    }

    #[test]
    fn test_reddit_query_deserialize() {
        let query: RedditQuery = serde_json::from_str(r#"{"sub": "rust", "type": "hot"}"#).unwrap();
        let (sub, kind) = query.validate().unwrap();
        assert_eq!(RedditQuery::cache_key(&sub, &kind), "rust_hot");
    }

    #[test]
    fn test_reddit_kind_defaults_to_new() {
        let query = RedditQuery { sub: Some("rust".into()), kind: None };
        assert_eq!(query.validate().unwrap().1, "new");
    }

    #[test]
    fn test_reddit_unknown_sort_is_rejected() {
        let query = RedditQuery { sub: Some("a".into()), kind: Some("b_new".into()) };
        let err = query.validate().unwrap_err();
        assert!(matches!(err, ApiError::InvalidQuery(ref name) if name == "type"));
    }

    #[test]
    fn test_reddit_sort_is_case_insensitive() {
        let query = RedditQuery { sub: Some("rust".into()), kind: Some(" Top ".into()) };
        assert_eq!(query.validate().unwrap().1, "top");
    }

    #[test]
    fn test_reddit_keys_are_distinct_for_underscored_subs() {
        let underscored = RedditQuery { sub: Some("a_b".into()), kind: Some("new".into()) };
        let (sub, kind) = underscored.validate().unwrap();
        let key = RedditQuery::cache_key(&sub, &kind);

        // Every accepted (sub, sort) pair that could spell the same key
        for sort in REDDIT_SORTS {
            if sort != "new" {
                assert_ne!(RedditQuery::cache_key("a_b", sort), key);
            }
            assert_ne!(RedditQuery::cache_key("a", sort), key);
        }
    }

    #[test]
    fn test_missing_required_query() {
        let err = NpmQuery::default().validate().unwrap_err();
        assert!(matches!(err, ApiError::MissingQuery(ref name) if name == "package"));

        let err = RedditQuery::default().validate().unwrap_err();
        assert!(matches!(err, ApiError::MissingQuery(ref name) if name == "sub"));
    }

    #[test]
    fn test_blank_repo_is_missing() {
        let query = GithubQuery { repo: Some(" ".into()) };
        assert!(query.validate().is_err());
    }

    #[test]
    fn test_twitch_login_is_lowercased() {
        let query = TwitchQuery { username: Some("Shroud".into()) };
        assert_eq!(query.validate().unwrap(), "shroud");

        let err = SteamQuery::default().validate().unwrap_err();
        assert!(matches!(err, ApiError::MissingQuery(ref name) if name == "username"));
    }
}
