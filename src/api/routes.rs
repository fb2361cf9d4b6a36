//! API Routes
//!
//! Configures the Axum router with all proxy endpoints.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    covid_handler, github_handler, health_handler, npm_handler, reddit_handler, session_handler,
    stats_handler, steam_handler, twitch_handler, validate_handler,
};
use super::AppState;

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let info = Router::new()
        .route("/covid", get(covid_handler))
        .route("/reddit", get(reddit_handler))
        .route("/npm", get(npm_handler))
        .route("/validate", get(validate_handler));

    let socials = Router::new()
        .route("/steam", get(steam_handler))
        .route("/github", get(github_handler))
        .route("/twitch", get(twitch_handler));

    Router::new()
        .nest("/info", info)
        .nest("/socials", socials)
        .route("/session", get(session_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
