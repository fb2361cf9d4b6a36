//! Twitch app access tokens.
//!
//! Helix calls carry a client-credentials token. It is fetched on first use
//! and reused until its `expires_in` runs out.

use std::fmt;

use tokio::sync::RwLock;
use tracing::info;

use super::{endpoints, Upstream};
use crate::clock::SharedClock;
use crate::error::UpstreamError;

#[derive(Debug, Clone)]
struct AppToken {
    access_token: String,
    /// Unix milliseconds
    expires_at: u64,
}

// == Twitch Auth ==
/// Client credentials plus the app token minted from them.
pub struct TwitchAuth {
    client_id: String,
    client_secret: String,
    token: RwLock<Option<AppToken>>,
    clock: SharedClock,
}

impl fmt::Debug for TwitchAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwitchAuth")
            .field("client_id", &self.client_id)
            .field("configured", &self.is_configured())
            .finish_non_exhaustive()
    }
}

impl TwitchAuth {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        clock: SharedClock,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token: RwLock::new(None),
            clock,
        }
    }

    /// Both the client id and secret are set.
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the current app token, minting a new one when none is held or
    /// the held one has expired.
    pub async fn access_token(&self, upstream: &dyn Upstream) -> Result<String, UpstreamError> {
        let now = self.clock.now_ms();
        if let Some(token) = self.token.read().await.as_ref() {
            if now < token.expires_at {
                return Ok(token.access_token.clone());
            }
        }

        let form = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", "client_credentials"),
        ];
        let body = upstream.post_form(endpoints::TWITCH_TOKEN, &form).await?;

        let access_token = body["access_token"]
            .as_str()
            .ok_or_else(|| UpstreamError::Shape {
                url: endpoints::TWITCH_TOKEN.to_string(),
                reason: "no access_token in token response".to_string(),
            })?
            .to_string();
        let expires_in = body["expires_in"].as_u64().unwrap_or(0);

        *self.token.write().await = Some(AppToken {
            access_token: access_token.clone(),
            expires_at: now.saturating_add(expires_in.saturating_mul(1000)),
        });
        info!(expires_in, "minted twitch app token");

        Ok(access_token)
    }

    /// Forgets the held token so the next call mints a fresh one.
    pub async fn invalidate(&self) {
        *self.token.write().await = None;
    }
}
