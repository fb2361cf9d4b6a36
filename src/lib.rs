//! Route Cache - per-route TTL response caching for a JSON proxy API
//!
//! Each proxied resource owns one [`cache::ResponseCache`]; handlers serve hits
//! and populate on miss. [`session::SessionResolver`] maps session cookies to
//! verified claims.

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod tasks;
pub mod upstream;

pub use api::AppState;
pub use config::Config;
pub use tasks::spawn_cleanup_task;
