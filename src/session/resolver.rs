//! Session Resolver Module
//!
//! Maps a request's `Cookie` header to a verified [`Claim`], memoizing
//! successful decodes by raw token.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::clock::{system_clock, SharedClock};
use crate::session::{cookie, Claim, JwtDecoder, TokenDecoder};

// == Session Resolver ==
/// Cookie-to-claim lookup with a process-lifetime memo.
///
/// The memo is an optimization only: every hit is re-checked against the
/// claim's own `exp`, and an expired hit is evicted.
pub struct SessionResolver {
    secret: String,
    decoder: Arc<dyn TokenDecoder>,
    memo: RwLock<HashMap<String, Claim>>,
    clock: SharedClock,
}

impl std::fmt::Debug for SessionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionResolver")
            .field("secret", &"<redacted>")
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl SessionResolver {
    // == Constructors ==
    /// Resolver backed by the HS256 [`JwtDecoder`] and the system clock.
    pub fn new(secret: impl Into<String>) -> Self {
        Self::with_decoder(secret, Arc::new(JwtDecoder::new()), system_clock())
    }

    pub fn with_decoder(
        secret: impl Into<String>,
        decoder: Arc<dyn TokenDecoder>,
        clock: SharedClock,
    ) -> Self {
        Self {
            secret: secret.into(),
            decoder,
            memo: RwLock::new(HashMap::new()),
            clock,
        }
    }

    // == Resolve ==
    /// Returns the claim for the session token in `cookie_header`, if any.
    ///
    /// Every failure (no header, no session cookie, bad token, expired claim)
    /// collapses to `None`.
    pub async fn resolve(&self, cookie_header: Option<&str>) -> Option<Claim> {
        let token = cookie::session_token(cookie_header?)?;
        let now = self.clock.now_secs();

        if let Some(claim) = self.memo_lookup(token, now).await {
            return claim;
        }

        let claim = match self.decoder.decode(token, &self.secret).await {
            Ok(claim) => claim,
            Err(err) => {
                debug!(error = %err, "session token rejected");
                return None;
            }
        };

        if claim.is_expired_at(self.clock.now_secs()) {
            debug!("decoded session already expired");
            return None;
        }

        self.memo
            .write()
            .await
            .insert(token.to_string(), claim.clone());
        Some(claim)
    }

    /// `Some(result)` when the memo decides the outcome, `None` to decode.
    async fn memo_lookup(&self, token: &str, now: u64) -> Option<Option<Claim>> {
        {
            let memo = self.memo.read().await;
            match memo.get(token) {
                None => return None,
                Some(claim) if !claim.is_expired_at(now) => {
                    debug!("session memo hit");
                    return Some(Some(claim.clone()));
                }
                Some(_) => {}
            }
        }

        // Re-check under the write lock; another request may have replaced it.
        let mut memo = self.memo.write().await;
        match memo.get(token) {
            Some(claim) if claim.is_expired_at(now) => {
                memo.remove(token);
                debug!("expired session evicted from memo");
                Some(None)
            }
            Some(claim) => Some(Some(claim.clone())),
            None => None,
        }
    }

    // == Maintenance ==
    /// Forgets a memoized token. Returns whether it was present.
    pub async fn invalidate(&self, token: &str) -> bool {
        self.memo.write().await.remove(token).is_some()
    }

    /// Drops every memoized claim past its `exp`.
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now_secs();
        let mut memo = self.memo.write().await;
        let before = memo.len();
        memo.retain(|_, claim| !claim.is_expired_at(now));
        before - memo.len()
    }

    pub async fn memo_len(&self) -> usize {
        self.memo.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::DecodeError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const NOW_SECS: u64 = 1_700_000_000;

    /// Decoder answering from a fixed table and counting calls.
    #[derive(Default)]
    struct TableDecoder {
        claims: HashMap<String, Claim>,
        calls: AtomicUsize,
    }

    impl TableDecoder {
        fn with(mut self, token: &str, claim: Claim) -> Self {
            self.claims.insert(token.to_string(), claim);
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TokenDecoder for TableDecoder {
        async fn decode(&self, token: &str, _secret: &str) -> Result<Claim, DecodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.claims
                .get(token)
                .cloned()
                .ok_or_else(|| DecodeError::Invalid(token.to_string()))
        }
    }

    fn build(decoder: TableDecoder) -> (SessionResolver, Arc<TableDecoder>, Arc<ManualClock>) {
        let decoder = Arc::new(decoder);
        let clock = Arc::new(ManualClock::new(NOW_SECS * 1000));
        let resolver = SessionResolver::with_decoder("secret", decoder.clone(), clock.clone());
        (resolver, decoder, clock)
    }

    #[tokio::test]
    async fn test_resolves_plain_cookie() {
        let claim = Claim::new("u1", NOW_SECS + 3600);
        let (resolver, _, _) = build(TableDecoder::default().with("abc", claim.clone()));

        let resolved = resolver.resolve(Some("next-auth.session-token=abc")).await;
        assert_eq!(resolved, Some(claim));
    }

    #[tokio::test]
    async fn test_expired_claim_resolves_to_none() {
        let claim = Claim::new("u1", NOW_SECS - 1);
        let (resolver, _, _) = build(TableDecoder::default().with("abc", claim));

        assert_eq!(resolver.resolve(Some("next-auth.session-token=abc")).await, None);
        assert_eq!(resolver.memo_len().await, 0);
    }

    #[tokio::test]
    async fn test_missing_header_skips_decoder() {
        let (resolver, decoder, _) = build(TableDecoder::default());

        assert_eq!(resolver.resolve(None).await, None);
        assert_eq!(resolver.resolve(Some("")).await, None);
        assert_eq!(resolver.resolve(Some("theme=dark")).await, None);
        assert_eq!(decoder.calls(), 0);
    }

    #[tokio::test]
    async fn test_undecodable_token_is_none() {
        let (resolver, decoder, _) = build(TableDecoder::default());

        assert_eq!(resolver.resolve(Some("next-auth.session-token=junk")).await, None);
        assert_eq!(decoder.calls(), 1);
        assert_eq!(resolver.memo_len().await, 0);
    }

    #[tokio::test]
    async fn test_secure_cookie_takes_precedence() {
        let secure = Claim::new("secure-user", NOW_SECS + 60);
        let plain = Claim::new("plain-user", NOW_SECS + 60);
        let (resolver, _, _) = build(
            TableDecoder::default()
                .with("s", secure.clone())
                .with("p", plain),
        );

        let header = "next-auth.session-token=p; __Secure-next-auth.session-token=s";
        assert_eq!(resolver.resolve(Some(header)).await, Some(secure));
    }

    #[tokio::test]
    async fn test_memo_hit_skips_decoder() {
        let claim = Claim::new("u1", NOW_SECS + 3600);
        let (resolver, decoder, _) = build(TableDecoder::default().with("abc", claim.clone()));
        let header = Some("next-auth.session-token=abc");

        assert_eq!(resolver.resolve(header).await, Some(claim.clone()));
        assert_eq!(resolver.resolve(header).await, Some(claim));
        assert_eq!(decoder.calls(), 1);
    }

    #[tokio::test]
    async fn test_memo_hit_past_expiry_is_evicted() {
        let claim = Claim::new("u1", NOW_SECS + 10);
        let (resolver, decoder, clock) = build(TableDecoder::default().with("abc", claim));
        let header = Some("next-auth.session-token=abc");

        assert!(resolver.resolve(header).await.is_some());
        assert_eq!(resolver.memo_len().await, 1);

        clock.advance_secs(10);
        assert_eq!(resolver.resolve(header).await, None);
        assert_eq!(resolver.memo_len().await, 0);
        assert_eq!(decoder.calls(), 1);
    }

    #[tokio::test]
    async fn test_purge_and_invalidate() {
        let (resolver, _, clock) = build(
            TableDecoder::default()
                .with("short", Claim::new("a", NOW_SECS + 5))
                .with("long", Claim::new("b", NOW_SECS + 500)),
        );
        resolver.resolve(Some("next-auth.session-token=short")).await;
        resolver.resolve(Some("next-auth.session-token=long")).await;
        assert_eq!(resolver.memo_len().await, 2);

        clock.advance_secs(6);
        assert_eq!(resolver.purge_expired().await, 1);

        assert!(resolver.invalidate("long").await);
        assert!(!resolver.invalidate("long").await);
        assert_eq!(resolver.memo_len().await, 0);
    }

    #[tokio::test]
    async fn test_real_jwt_round_trip() {
        use jsonwebtoken::{encode, EncodingKey, Header};

        let exp = chrono::Utc::now().timestamp() as u64 + 600;
        let token = encode(
            &Header::default(),
            &Claim::new("u1", exp),
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();

        let resolver = SessionResolver::new("secret");
        let header = format!("__Secure-next-auth.session-token={token}");
        let claim = resolver.resolve(Some(&header)).await.unwrap();
        assert_eq!(claim.sub.as_deref(), Some("u1"));
    }
}
