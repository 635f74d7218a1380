//! Domain-level error types.

use thiserror::Error;

/// Value object validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("invalid {field}: '{value}'")]
    InvalidFormat { field: &'static str, value: String },

    #[error("unknown {field}: '{value}'")]
    UnknownVariant { field: &'static str, value: String },
}

/// Credential verification errors.
///
/// All variants mean the same thing to the transport: authentication failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Authentication error: No token provided")]
    MissingCredential,

    #[error("Authentication error: Malformed token ({0})")]
    Malformed(String),

    #[error("Authentication error: Token expired")]
    Expired,

    #[error("Authentication error: Invalid token")]
    InvalidSignature,
}

/// Room registry errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Connection '{0}' is already registered")]
    DuplicateConnection(String),

    #[error("Connection '{0}' not found")]
    ConnectionNotFound(String),
}

/// Message push errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("Connection '{0}' not found")]
    ConnectionNotFound(String),

    #[error("Failed to push message: {0}")]
    PushFailed(String),

    #[error("Failed to serialize event: {0}")]
    Serialization(String),
}
