//! Server configuration.
//!
//! Values come from command-line flags with environment fallbacks (see the
//! server binary). This module only validates them.

use thiserror::Error;

use crate::infrastructure::auth::MIN_SECRET_LENGTH;

/// Signing secret used when neither `--jwt-secret` nor `JWT_SECRET` is set.
pub const DEV_JWT_SECRET: &str = "skillsync_local_development_jwt_secret_change_me";

/// Origin value that enables permissive CORS.
pub const ANY_ORIGIN: &str = "*";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("host must not be empty")]
    EmptyHost,

    #[error("JWT secret must be at least {min} bytes (got {actual})")]
    SecretTooShort { min: usize, actual: usize },

    #[error("client URL must be '*' or an http(s) origin, got '{0}'")]
    InvalidClientUrl(String),
}

/// Validated server settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    /// Allowed browser origin for CORS (`*` for any).
    pub client_url: String,
}

impl ServerConfig {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        jwt_secret: impl Into<String>,
        client_url: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            host: host.into(),
            port,
            jwt_secret: jwt_secret.into(),
            client_url: client_url.into(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if self.jwt_secret.len() < MIN_SECRET_LENGTH {
            return Err(ConfigError::SecretTooShort {
                min: MIN_SECRET_LENGTH,
                actual: self.jwt_secret.len(),
            });
        }
        if !self.allows_any_origin() && !is_http_origin(&self.client_url) {
            return Err(ConfigError::InvalidClientUrl(self.client_url.clone()));
        }
        Ok(())
    }

    /// `host:port` for the TCP listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn allows_any_origin(&self) -> bool {
        self.client_url == ANY_ORIGIN
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

fn is_http_origin(url: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    matches!(rest, Some(host) if !host.is_empty() && !host.contains(char::is_whitespace))
}
