//! Expiry Sweep Task
//!
//! Background task that periodically purges expired route-cache entries and
//! expired session memo entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::api::RouteCaches;
use crate::session::SessionResolver;

/// Spawns the periodic sweep.
///
/// Reads already treat expired entries as misses; the sweep only reclaims
/// memory for keys nobody asks for again.
///
/// # Returns
/// A JoinHandle to abort the task during graceful shutdown.
pub fn spawn_cleanup_task(
    caches: RouteCaches,
    sessions: Arc<SessionResolver>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()> {
    // A zero interval would spin
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting expiry sweep with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let entries = caches.cleanup_expired().await;
            let claims = sessions.purge_expired().await;

            if entries > 0 || claims > 0 {
                info!(
                    "Expiry sweep: removed {} cache entries and {} session claims",
                    entries, claims
                );
            } else {
                debug!("Expiry sweep: nothing expired");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::Config;
    use crate::session::JwtDecoder;
    use serde_json::Value;

    fn fixtures() -> (RouteCaches, Arc<SessionResolver>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(0));
        let caches = RouteCaches::from_config(&Config::default(), clock.clone());
        let sessions = Arc::new(SessionResolver::with_decoder(
            "secret",
            Arc::new(JwtDecoder::new()),
            clock.clone(),
        ));
        (caches, sessions, clock)
    }

    #[tokio::test]
    async fn test_sweep_removes_expired_entries() {
        let (caches, sessions, clock) = fixtures();
        caches.covid.set("uk", Value::from("stats")).await;

        let handle = spawn_cleanup_task(caches.clone(), sessions, 1);

        clock.advance_secs(601);
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(caches.covid.size().await, 0, "expired entry should be swept");
        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_preserves_valid_entries() {
        let (caches, sessions, _) = fixtures();
        caches.npm.set("axum", Value::from("summary")).await;

        let handle = spawn_cleanup_task(caches.clone(), sessions, 1);
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(caches.npm.get("axum").await, Some(Value::from("summary")));
        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_can_be_aborted() {
        let (caches, sessions, _) = fixtures();

        let handle = spawn_cleanup_task(caches, sessions, 1);
        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
