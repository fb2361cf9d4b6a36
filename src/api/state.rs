//! Application state shared across all handlers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::Value;

use crate::cache::{CacheStats, ResponseCache};
use crate::clock::{system_clock, SharedClock};
use crate::config::Config;
use crate::session::SessionResolver;
use crate::upstream::{TwitchAuth, Upstream};

type JsonCache = Arc<ResponseCache<Value>>;

// == Route Caches ==
/// One cache per proxied resource. Key spaces never mix.
#[derive(Debug, Clone)]
pub struct RouteCaches {
    pub covid: JsonCache,
    pub reddit: JsonCache,
    pub npm: JsonCache,
    pub github: JsonCache,
    pub steam: JsonCache,
    pub twitch: JsonCache,
}

impl RouteCaches {
    pub fn from_config(config: &Config, clock: SharedClock) -> Self {
        let cache = |name: &str, ttl| Arc::new(ResponseCache::with_clock(name, ttl, clock.clone()));
        Self {
            covid: cache("covid", config.covid_ttl()),
            reddit: cache("reddit", config.reddit_ttl()),
            npm: cache("npm", config.npm_ttl()),
            github: cache("github", config.github_ttl()),
            steam: cache("steam", config.steam_ttl()),
            twitch: cache("twitch", config.twitch_ttl()),
        }
    }

    pub fn all(&self) -> [&JsonCache; 6] {
        [
            &self.covid,
            &self.reddit,
            &self.npm,
            &self.github,
            &self.steam,
            &self.twitch,
        ]
    }

    /// Sweeps every cache; returns the total purged.
    pub async fn cleanup_expired(&self) -> usize {
        let mut removed = 0;
        for cache in self.all() {
            removed += cache.cleanup_expired().await;
        }
        removed
    }

    /// `(name, ttl_secs, stats)` for each cache.
    pub async fn stats(&self) -> Vec<(String, u64, CacheStats)> {
        let mut out = Vec::with_capacity(6);
        for cache in self.all() {
            out.push((
                cache.name().to_string(),
                cache.ttl().as_secs(),
                cache.stats().await,
            ));
        }
        out
    }
}

// == App State ==
#[derive(Clone)]
pub struct AppState {
    pub caches: RouteCaches,
    pub sessions: Arc<SessionResolver>,
    pub upstream: Arc<dyn Upstream>,
    /// Steam Web API key; empty when unset
    pub steam_api_key: Arc<str>,
    pub twitch: Arc<TwitchAuth>,
    /// Rotates which cached reddit post is served
    reddit_cursor: Arc<AtomicUsize>,
}

impl AppState {
    pub fn new(
        caches: RouteCaches,
        sessions: Arc<SessionResolver>,
        upstream: Arc<dyn Upstream>,
    ) -> Self {
        Self {
            caches,
            sessions,
            upstream,
            steam_api_key: Arc::from(""),
            twitch: Arc::new(TwitchAuth::new("", "", system_clock())),
            reddit_cursor: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Builds caches, the session resolver and vendor credentials from
    /// configuration.
    pub fn from_config(config: &Config, upstream: Arc<dyn Upstream>) -> Self {
        let clock = system_clock();
        Self::new(
            RouteCaches::from_config(config, clock.clone()),
            Arc::new(SessionResolver::new(config.session_secret.clone())),
            upstream,
        )
        .with_steam_key(config.steam_api_key.as_str())
        .with_twitch(TwitchAuth::new(
            config.twitch_client_id.as_str(),
            config.twitch_client_secret.as_str(),
            clock,
        ))
    }

    pub fn with_steam_key(mut self, key: &str) -> Self {
        self.steam_api_key = Arc::from(key);
        self
    }

    pub fn with_twitch(mut self, twitch: TwitchAuth) -> Self {
        self.twitch = Arc::new(twitch);
        self
    }

    /// Next index in `0..len`, cycling across requests.
    pub fn next_reddit_index(&self, len: usize) -> usize {
        self.reddit_cursor.fetch_add(1, Ordering::Relaxed) % len.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    #[tokio::test]
    async fn test_caches_are_independent() {
        let caches = RouteCaches::from_config(&Config::default(), Arc::new(ManualClock::new(0)));

        caches.covid.set("uk", Value::from(1)).await;
        assert_eq!(caches.npm.get("uk").await, None);
        assert_eq!(caches.covid.get("uk").await, Some(Value::from(1)));
    }

    #[tokio::test]
    async fn test_cleanup_sweeps_all_caches() {
        let clock = Arc::new(ManualClock::new(0));
        let caches = RouteCaches::from_config(&Config::default(), clock.clone());

        caches.reddit.set("rust_new", Value::Null).await;
        caches.npm.set("axum", Value::Null).await;

        // Past the reddit TTL (300s), within npm's (3600s)
        clock.advance_secs(301);
        assert_eq!(caches.cleanup_expired().await, 1);
        assert_eq!(caches.npm.size().await, 1);
    }

    #[tokio::test]
    async fn test_stats_lists_every_cache() {
        let caches = RouteCaches::from_config(&Config::default(), Arc::new(ManualClock::new(0)));
        let names: Vec<String> = caches.stats().await.into_iter().map(|(n, _, _)| n).collect();
        assert_eq!(names, vec!["covid", "reddit", "npm", "github", "steam", "twitch"]);
    }

    #[test]
    fn test_from_config_carries_credentials() {
        struct NoUpstream;

        #[async_trait::async_trait]
        impl Upstream for NoUpstream {
            async fn get_json_with(
                &self,
                url: &str,
                _headers: &[(&str, &str)],
            ) -> Result<Value, crate::error::UpstreamError> {
                Err(crate::error::UpstreamError::Status { url: url.to_string(), status: 503 })
            }

            async fn post_form(
                &self,
                url: &str,
                _form: &[(&str, &str)],
            ) -> Result<Value, crate::error::UpstreamError> {
                self.get_json(url).await
            }
        }

        let config = Config {
            steam_api_key: "steam-key".to_string(),
            twitch_client_id: "id".to_string(),
            twitch_client_secret: "secret".to_string(),
            ..Config::default()
        };
        let state = AppState::from_config(&config, Arc::new(NoUpstream));
        assert_eq!(&*state.steam_api_key, "steam-key");
        assert!(state.twitch.is_configured());

        let bare = AppState::from_config(&Config::default(), Arc::new(NoUpstream));
        assert!(bare.steam_api_key.is_empty());
        assert!(!bare.twitch.is_configured());
    }
}
