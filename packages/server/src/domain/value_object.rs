//! Value objects of the relay domain.
//!
//! Every value object validates its input on construction, so code holding one never has to
//! re-check emptiness or enum membership.

use std::{fmt, str::FromStr};

use serde::Serialize;

use super::error::ValueObjectError;

/// Maximum length of an email address
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Client-supplied ids and text are only required to be non-empty; channel names and
/// message bodies are relayed as sent.
fn validate_non_empty(field: &'static str, value: &str) -> Result<(), ValueObjectError> {
    if value.is_empty() {
        return Err(ValueObjectError::Empty(field));
    }
    Ok(())
}

/// Declares a validated string newtype.
macro_rules! string_value_object {
    ($(#[$meta:meta])* $name:ident, $validate:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: String) -> Result<Self, ValueObjectError> {
                let validate: fn(&str) -> Result<(), ValueObjectError> = $validate;
                validate(&value)?;
                Ok(Self(value))
            }

            /// Wrap a value produced by a server-side generator that already satisfies the
            /// invariants.
            #[allow(dead_code)]
            pub(crate) fn from_generated(value: String) -> Self {
                let validate: fn(&str) -> Result<(), ValueObjectError> = $validate;
                debug_assert!(validate(&value).is_ok());
                Self(value)
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValueObjectError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = ValueObjectError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value.to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_value_object!(
    /// Authenticated user identifier (the `id` claim of the credential)
    UserId,
    |v| validate_non_empty("user id", v)
);

string_value_object!(
    /// Email address bound to an identity
    Email,
    |v| {
        validate_non_empty("email", v)?;
        if v.chars().count() > MAX_EMAIL_LENGTH {
            return Err(ValueObjectError::TooLong {
                field: "email",
                max: MAX_EMAIL_LENGTH,
            });
        }
        if !v.contains('@') {
            return Err(ValueObjectError::InvalidFormat {
                field: "email",
                value: v.to_string(),
            });
        }
        Ok(())
    }
);

string_value_object!(
    /// Client-supplied chat identifier; names a topic channel
    ChatId,
    |v| validate_non_empty("chat id", v)
);

string_value_object!(
    /// Tutoring session identifier
    SessionId,
    |v| validate_non_empty("session id", v)
);

string_value_object!(
    /// Transport-assigned connection identifier
    ConnectionId,
    |v| validate_non_empty("connection id", v)
);

string_value_object!(
    /// Server-generated chat message identifier
    MessageId,
    |v| validate_non_empty("message id", v)
);

string_value_object!(
    /// Server-generated notification identifier
    NotificationId,
    |v| validate_non_empty("notification id", v)
);

string_value_object!(
    /// Chat message or notification body
    MessageText,
    |v| validate_non_empty("message", v)
);

string_value_object!(
    /// Notification title
    NotificationTitle,
    |v| validate_non_empty("title", v)
);

/// Unix timestamp in milliseconds (UTC)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// Named broadcast group.
///
/// Personal channels are derived from the identity (`user_<id>`); topic channels from a
/// client-supplied chat id (`chat_<chatId>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChannelName {
    Personal(UserId),
    Topic(ChatId),
}

impl ChannelName {
    pub fn personal(user_id: &UserId) -> Self {
        Self::Personal(user_id.clone())
    }

    pub fn topic(chat_id: &ChatId) -> Self {
        Self::Topic(chat_id.clone())
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Personal(user_id) => write!(f, "user_{}", user_id),
            Self::Topic(chat_id) => write!(f, "chat_{}", chat_id),
        }
    }
}

/// Declares a closed set of wire names.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident, $field:literal, { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }
        }

        impl FromStr for $name {
            type Err = ValueObjectError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok(Self::$variant),)+
                    other => Err(ValueObjectError::UnknownVariant {
                        field: $field,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum!(
    /// Kind of a notification
    NotificationKind, "notification type", {
        SessionBooked => "session_booked",
        Message => "message",
        SkillCompleted => "skill_completed",
        JobApplication => "job_application",
    }
);

wire_enum!(
    /// Status of a tutoring session
    SessionStatus, "session status", {
        Started => "started",
        Ended => "ended",
        Paused => "paused",
    }
);

wire_enum!(
    /// Presence of a user
    PresenceStatus, "presence status", {
        Online => "online",
        Away => "away",
        Busy => "busy",
        Offline => "offline",
    }
);

impl PresenceStatus {
    /// Parse a status reported by a client. `offline` is reserved for the server.
    pub fn parse_reported(s: &str) -> Result<Self, ValueObjectError> {
        match s.parse::<Self>()? {
            Self::Offline => Err(ValueObjectError::UnknownVariant {
                field: "presence status",
                value: s.to_string(),
            }),
            status => Ok(status),
        }
    }
}
