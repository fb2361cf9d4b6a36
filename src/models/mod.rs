//! Request and Response models for the proxy API
//!
//! Query strings in, JSON envelopes out.

pub mod requests;
pub mod responses;

pub use requests::{
    CovidQuery, GithubQuery, NpmQuery, RedditQuery, SteamQuery, TwitchQuery, REDDIT_SORTS,
};
pub use responses::{CacheStatsResponse, DataResponse, HealthResponse, StatsResponse};
