//! Session Module
//!
//! Resolves the caller identity from the session cookie.

mod claim;
pub mod cookie;
mod decoder;
mod resolver;

pub use claim::Claim;
pub use decoder::{JwtDecoder, TokenDecoder};
pub use resolver::SessionResolver;
