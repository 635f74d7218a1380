//! HS256 JWT implementation of the `TokenVerifier` port.

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use skillsync_shared::time::get_timestamp_millis;
use thiserror::Error;

use crate::domain::{AuthError, Email, Identity, TokenVerifier, UserId};

/// Default lifetime of issued tokens (7 days)
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Minimum accepted signing secret length in bytes
pub const MIN_SECRET_LENGTH: usize = 32;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    id: String,
    email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    iat: i64,
    exp: i64,
}

/// Verifier construction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JwtConfigError {
    #[error("jwt secret must be at least 32 bytes long")]
    SecretTooShort,

    #[error("token lifetime must be a positive number of hours that fits in seconds, got {0}")]
    InvalidTtlHours(i64),
}

/// Convert a token lifetime in hours to seconds
pub fn ttl_seconds_from_hours(hours: i64) -> Result<i64, JwtConfigError> {
    if hours <= 0 {
        return Err(JwtConfigError::InvalidTtlHours(hours));
    }
    hours
        .checked_mul(60 * 60)
        .ok_or(JwtConfigError::InvalidTtlHours(hours))
}

/// Verifies (and, for development, issues) HS256-signed access tokens
#[derive(Clone)]
pub struct JwtTokenVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtTokenVerifier {
    pub fn new(secret: &str) -> Result<Self, JwtConfigError> {
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(JwtConfigError::SecretTooShort);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    /// Issue a token for `identity` valid for `ttl_seconds` from now
    pub fn issue(
        &self,
        identity: &Identity,
        role: Option<&str>,
        ttl_seconds: i64,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue_at(identity, role, get_timestamp_millis() / 1000, ttl_seconds)
    }

    fn issue_at(
        &self,
        identity: &Identity,
        role: Option<&str>,
        issued_at: i64,
        ttl_seconds: i64,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            id: identity.user_id.as_str().to_string(),
            email: identity.email.as_str().to_string(),
            role: role.map(str::to_string),
            iat: issued_at,
            exp: issued_at.saturating_add(ttl_seconds),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
    }
}

impl TokenVerifier for JwtTokenVerifier {
    fn verify(&self, credential: &str) -> Result<Identity, AuthError> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(AuthError::MissingCredential);
        }

        let claims = decode::<Claims>(credential, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::Malformed(e.to_string()),
            })?
            .claims;

        let user_id = UserId::new(claims.id).map_err(|e| AuthError::Malformed(e.to_string()))?;
        let email = Email::new(claims.email).map_err(|e| AuthError::Malformed(e.to_string()))?;

        Ok(Identity::new(user_id, email))
    }
}
