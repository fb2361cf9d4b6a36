//! API Module
//!
//! HTTP handlers and routing for the proxy API.
//!
//! # Endpoints
//! - `GET /info/covid` - COVID stats for a country or worldwide
//! - `GET /info/reddit` - A post from a subreddit listing
//! - `GET /info/npm` - npm package summary
//! - `GET /info/validate` - API token check
//! - `GET /socials/steam` - Steam profile with its ban record
//! - `GET /socials/github` - GitHub repository metadata
//! - `GET /socials/twitch` - Twitch channel with its live stream
//! - `GET /session` - The caller's session claim
//! - `GET /stats` - Per-cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;
mod state;

pub use handlers::*;
pub use routes::create_router;
pub use state::{AppState, RouteCaches};
