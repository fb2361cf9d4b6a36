//! Route Cache - JSON proxy API with per-route response caching
//!
//! Startup:
//! 1. Initialize tracing subscriber for logging
//! 2. Load configuration from environment variables
//! 3. Build route caches, session resolver and upstream client
//! 4. Start background expiry sweep
//! 5. Serve the Axum router until SIGINT/SIGTERM

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use route_cache::api::create_router;
use route_cache::upstream::HttpUpstream;
use route_cache::{spawn_cleanup_task, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "route_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Route Cache server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, cleanup_interval={}s, ttl covid={}s reddit={}s npm={}s github={}s steam={}s twitch={}s",
        config.server_port,
        config.cleanup_interval,
        config.covid_ttl,
        config.reddit_ttl,
        config.npm_ttl,
        config.github_ttl,
        config.steam_ttl,
        config.twitch_ttl
    );
    if config.session_secret.is_empty() {
        warn!("SESSION_SECRET is not set; every session will resolve as anonymous");
    }
    if config.steam_api_key.is_empty() {
        warn!("STEAM_API_KEY is not set; /socials/steam is disabled");
    }
    if config.twitch_client_id.is_empty() || config.twitch_client_secret.is_empty() {
        warn!("TWITCH_CLIENT_ID/TWITCH_CLIENT_SECRET not set; /socials/twitch is disabled");
    }

    let upstream = HttpUpstream::new().context("failed to build HTTP client")?;
    let state = AppState::from_config(&config, Arc::new(upstream));

    let cleanup_handle = spawn_cleanup_task(
        state.caches.clone(),
        state.sessions.clone(),
        config.cleanup_interval,
    );

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for Ctrl+C or SIGTERM, then stops the sweep task.
async fn shutdown_signal(cleanup_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    cleanup_handle.abort();
    warn!("Expiry sweep aborted");
}
