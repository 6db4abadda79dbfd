//! `gradebook-auth` — token decoding and identity-provider client.
//!
//! Token *claims* are decoded and validated here; cryptographic signature
//! verification is intentionally out of scope (the provider signs, and the
//! deployment trusts its gateway).

pub mod claims;
pub mod oauth;

pub use claims::{validate_and_get_claims, TokenClaims, TokenError};
pub use oauth::OAuthClient;
