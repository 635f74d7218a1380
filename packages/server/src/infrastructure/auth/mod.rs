//! Credential verification.
//!
//! ## 実装
//!
//! - `jwt`: HS256 で署名された JWT を検証する実装

pub mod jwt;

pub use jwt::{
    DEFAULT_TOKEN_TTL_SECONDS, JwtConfigError, JwtTokenVerifier, MIN_SECRET_LENGTH,
    ttl_seconds_from_hours,
};
