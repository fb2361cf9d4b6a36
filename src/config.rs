//! Configuration Module
//!
//! Loads server, session and per-route cache settings from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Background sweep interval in seconds
    pub cleanup_interval: u64,
    /// Secret used to verify session tokens
    pub session_secret: String,
    /// TTL in seconds for COVID stats
    pub covid_ttl: u64,
    /// TTL in seconds for subreddit listings
    pub reddit_ttl: u64,
    /// TTL in seconds for npm package summaries
    pub npm_ttl: u64,
    /// TTL in seconds for GitHub repository metadata
    pub github_ttl: u64,
    /// Steam Web API key; empty disables the steam route
    pub steam_api_key: String,
    /// TTL in seconds for steam profiles
    pub steam_ttl: u64,
    /// Twitch application client id
    pub twitch_client_id: String,
    /// Twitch application client secret
    pub twitch_client_secret: String,
    /// TTL in seconds for twitch channel info
    pub twitch_ttl: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 60)
    /// - `SESSION_SECRET` - Session token secret (default: empty)
    /// - `COVID_TTL` - COVID cache TTL in seconds (default: 600)
    /// - `REDDIT_TTL` - Reddit cache TTL in seconds (default: 300)
    /// - `NPM_TTL` - npm cache TTL in seconds (default: 3600)
    /// - `GITHUB_TTL` - GitHub cache TTL in seconds (default: 900)
    /// - `STEAM_API_KEY` - Steam Web API key (default: empty)
    /// - `STEAM_TTL` - Steam cache TTL in seconds (default: 900)
    /// - `TWITCH_CLIENT_ID` / `TWITCH_CLIENT_SECRET` - Twitch app credentials (default: empty)
    /// - `TWITCH_TTL` - Twitch cache TTL in seconds (default: 120)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            session_secret: env::var("SESSION_SECRET").unwrap_or(defaults.session_secret),
            covid_ttl: env_or("COVID_TTL", defaults.covid_ttl),
            reddit_ttl: env_or("REDDIT_TTL", defaults.reddit_ttl),
            npm_ttl: env_or("NPM_TTL", defaults.npm_ttl),
            github_ttl: env_or("GITHUB_TTL", defaults.github_ttl),
            steam_api_key: env::var("STEAM_API_KEY").unwrap_or(defaults.steam_api_key),
            steam_ttl: env_or("STEAM_TTL", defaults.steam_ttl),
            twitch_client_id: env::var("TWITCH_CLIENT_ID").unwrap_or(defaults.twitch_client_id),
            twitch_client_secret: env::var("TWITCH_CLIENT_SECRET")
                .unwrap_or(defaults.twitch_client_secret),
            twitch_ttl: env_or("TWITCH_TTL", defaults.twitch_ttl),
        }
    }

    pub fn covid_ttl(&self) -> Duration {
        Duration::from_secs(self.covid_ttl)
    }

    pub fn reddit_ttl(&self) -> Duration {
        Duration::from_secs(self.reddit_ttl)
    }

    pub fn npm_ttl(&self) -> Duration {
        Duration::from_secs(self.npm_ttl)
    }

    pub fn github_ttl(&self) -> Duration {
        Duration::from_secs(self.github_ttl)
    }

    pub fn steam_ttl(&self) -> Duration {
        Duration::from_secs(self.steam_ttl)
    }

    pub fn twitch_ttl(&self) -> Duration {
        Duration::from_secs(self.twitch_ttl)
    }
}

/// Parses `name`, falling back to `default` when unset or malformed.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cleanup_interval: 60,
            session_secret: String::new(),
            covid_ttl: 600,
            reddit_ttl: 300,
            npm_ttl: 3600,
            github_ttl: 900,
            steam_api_key: String::new(),
            steam_ttl: 900,
            twitch_client_id: String::new(),
            twitch_client_secret: String::new(),
            twitch_ttl: 120,
        }
    }
}
