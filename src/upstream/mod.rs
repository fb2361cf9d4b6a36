//! Upstream Module
//!
//! Outbound JSON fetches for the proxy routes. Routes only ever see the
//! [`Upstream`] trait, so tests can swap in canned responses.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::UpstreamError;

mod twitch;

pub use twitch::TwitchAuth;

const USER_AGENT: &str = concat!("route_cache/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// == Upstream Trait ==
/// Fetch collaborator consulted on a cache miss.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// GETs `url` with extra request headers and parses the body as JSON.
    async fn get_json_with(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<Value, UpstreamError>;

    /// POSTs `form` url-encoded to `url` and parses the body as JSON.
    async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<Value, UpstreamError>;

    /// GETs `url` and parses the body as JSON.
    async fn get_json(&self, url: &str) -> Result<Value, UpstreamError> {
        self.get_json_with(url, &[]).await
    }
}

// == HTTP Upstream ==
/// `reqwest`-backed upstream with a shared connection pool.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: Client,
}

impl HttpUpstream {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }

    async fn execute(&self, url: &str, request: RequestBuilder) -> Result<Value, UpstreamError> {
        debug!(url, "fetching upstream");

        let transport = |source| UpstreamError::Transport {
            url: url.to_string(),
            source,
        };

        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            warn!(url, status = status.as_u16(), "upstream returned error status");
            return Err(UpstreamError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.json::<Value>().await.map_err(transport)
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn get_json_with(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<Value, UpstreamError> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        self.execute(url, request).await
    }

    async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<Value, UpstreamError> {
        self.execute(url, self.client.post(url).form(form)).await
    }
}

// == Endpoints ==
/// URL builders for each proxied service. Path input is percent-encoded.
pub mod endpoints {
    use super::Url;

    const DISEASE_SH: &str = "https://disease.sh/v3/covid-19/";
    const REDDIT: &str = "https://reddit.com/r/";
    const NPM_REGISTRY: &str = "https://registry.npmjs.com/";
    const GITHUB_REPOS: &str = "https://api.github.com/repos/";
    const STEAM_USER: &str = "https://api.steampowered.com/ISteamUser/";
    const TWITCH_HELIX: &str = "https://api.twitch.tv/helix/";

    /// Client-credentials token endpoint for Helix.
    pub const TWITCH_TOKEN: &str = "https://id.twitch.tv/oauth2/token";

    /// Key used for worldwide COVID totals.
    pub const ALL_COUNTRIES: &str = "/all";

    fn with_segments<'a>(base: &str, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = Url::parse(base).expect("endpoint base URLs are valid");
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn with_query<'a>(mut url: Url, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
        url.query_pairs_mut().extend_pairs(pairs);
        url.into()
    }

    pub fn covid(country: &str) -> String {
        if country == ALL_COUNTRIES {
            return format!("{DISEASE_SH}all");
        }
        with_segments(DISEASE_SH, ["countries", country]).into()
    }

    pub fn reddit(sub: &str, kind: &str) -> String {
        let listing = format!("{kind}.json");
        let mut url = with_segments(REDDIT, [sub, listing.as_str()]);
        url.set_query(Some("limit=20"));
        url.into()
    }

    /// Scoped names (`@scope/pkg`) stay one segment, as the registry expects.
    pub fn npm(package: &str) -> String {
        with_segments(NPM_REGISTRY, [package]).into()
    }

    /// `repo` is `owner/name`.
    pub fn github(repo: &str) -> String {
        with_segments(GITHUB_REPOS, repo.split('/')).into()
    }

    /// Resolves a custom profile name to a 64-bit steam id.
    pub fn steam_resolve(key: &str, vanity: &str) -> String {
        let url = with_segments(STEAM_USER, ["ResolveVanityURL", "v0001"]);
        with_query(url, [("key", key), ("vanityurl", vanity)])
    }

    pub fn steam_summaries(key: &str, steam_id: &str) -> String {
        let url = with_segments(STEAM_USER, ["GetPlayerSummaries", "v0002"]);
        with_query(url, [("key", key), ("steamids", steam_id)])
    }

    pub fn steam_bans(key: &str, steam_id: &str) -> String {
        let url = with_segments(STEAM_USER, ["GetPlayerBans", "v1"]);
        with_query(url, [("key", key), ("steamids", steam_id)])
    }

    pub fn twitch_user(login: &str) -> String {
        with_query(with_segments(TWITCH_HELIX, ["users"]), [("login", login)])
    }

    /// Empty `data` when the channel is offline.
    pub fn twitch_stream(login: &str) -> String {
        with_query(with_segments(TWITCH_HELIX, ["streams"]), [("user_login", login)])
    }
}
