//! Token decoders.
//!
//! A decoder is the only authority on whether a token is genuine.

use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::error::DecodeError;
use crate::session::Claim;

// == Decoder Trait ==
/// Turns a raw token into a verified [`Claim`].
#[async_trait]
pub trait TokenDecoder: Send + Sync {
    async fn decode(&self, token: &str, secret: &str) -> Result<Claim, DecodeError>;
}

// == JWT Decoder ==
/// HS256 JWT decoder. Requires and enforces `exp` with no leeway.
///
/// No audience is configured, so an `aud` claim is accepted as is.
#[derive(Debug, Clone)]
pub struct JwtDecoder {
    validation: Validation,
}

impl JwtDecoder {
    pub fn new() -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);
        Self { validation }
    }
}

impl Default for JwtDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenDecoder for JwtDecoder {
    async fn decode(&self, token: &str, secret: &str) -> Result<Claim, DecodeError> {
        if secret.is_empty() {
            return Err(DecodeError::MissingSecret);
        }

        let data = decode::<Claim>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &self.validation,
        )?;
        Ok(data.claims)
    }
}
