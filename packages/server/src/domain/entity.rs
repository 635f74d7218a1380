//! Domain entities.

use std::collections::BTreeSet;

use super::value_object::{
    ChannelName, ChatId, ConnectionId, Email, MessageId, MessageText, NotificationId,
    NotificationKind, NotificationTitle, PresenceStatus, SessionId, SessionStatus, Timestamp,
    UserId,
};

/// Authenticated user bound to a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub email: Email,
}

impl Identity {
    pub fn new(user_id: UserId, email: Email) -> Self {
        Self { user_id, email }
    }

    /// The personal channel of this identity (`user_<id>`)
    pub fn personal_channel(&self) -> ChannelName {
        ChannelName::personal(&self.user_id)
    }
}

/// Lifecycle state of a registered connection.
///
/// Connecting, authenticating and rejected handshakes never produce a `Connection`;
/// a registered connection starts `Active` and ends `Closing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Active,
    Closing,
}

/// A live, authenticated client connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub id: ConnectionId,
    identity: Identity,
    pub state: ConnectionState,
    pub topics: BTreeSet<ChatId>,
    pub connected_at: Timestamp,
}

impl Connection {
    /// Create an active connection with no topic channels
    pub fn new(id: ConnectionId, identity: Identity, connected_at: Timestamp) -> Self {
        Self {
            id,
            identity,
            state: ConnectionState::Active,
            topics: BTreeSet::new(),
            connected_at,
        }
    }

    /// Identity bound at authentication; immutable for the connection's lifetime
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn user_id(&self) -> &UserId {
        &self.identity.user_id
    }

    pub fn email(&self) -> &Email {
        &self.identity.email
    }

    pub fn is_active(&self) -> bool {
        self.state == ConnectionState::Active
    }

    /// Every channel this connection belongs to: its personal channel plus joined topics
    pub fn channels(&self) -> Vec<ChannelName> {
        std::iter::once(self.identity.personal_channel())
            .chain(self.topics.iter().map(ChannelName::topic))
            .collect()
    }
}

/// Chat message relayed to a topic channel (and optionally a direct recipient)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub sender_id: UserId,
    pub sender_email: Email,
    pub text: MessageText,
    pub chat_id: ChatId,
    pub receiver_id: Option<UserId>,
    pub timestamp: Timestamp,
}

/// Notification delivered to a single user's personal channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub kind: NotificationKind,
    pub title: NotificationTitle,
    pub text: MessageText,
    pub timestamp: Timestamp,
    pub read: bool,
}

/// Tutoring session status record sent to each participant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatusUpdate {
    pub session_id: SessionId,
    pub status: SessionStatus,
    pub timestamp: Timestamp,
}

/// Presence change of a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceUpdate {
    pub user_id: UserId,
    pub status: PresenceStatus,
    pub last_seen: Timestamp,
}
