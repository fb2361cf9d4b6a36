//! Decoded session payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// == Claim ==
/// Verified identity payload carried by a session token.
///
/// Only `exp` is interpreted here; everything else is passed through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    /// Subject (user id)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Expiry as Unix seconds
    pub exp: u64,
    /// Remaining claims (name, email, picture, iat, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claim {
    pub fn new(sub: impl Into<String>, exp: u64) -> Self {
        Self {
            sub: Some(sub.into()),
            exp,
            extra: Map::new(),
        }
    }

    /// A claim stops being valid at the second it declares as `exp`.
    pub fn is_expired_at(&self, now_secs: u64) -> bool {
        now_secs >= self.exp
    }
}
