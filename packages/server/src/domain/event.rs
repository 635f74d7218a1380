//! Validated inbound commands and outbound events.

use super::{
    entity::{ChatMessage, Notification, PresenceUpdate, SessionStatusUpdate},
    value_object::{
        ChatId, Email, MessageText, NotificationKind, NotificationTitle, PresenceStatus, SessionId,
        SessionStatus, UserId,
    },
};

/// Command received from an active connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    JoinChat(ChatId),
    LeaveChat(ChatId),
    SendMessage {
        chat_id: ChatId,
        text: MessageText,
        receiver_id: Option<UserId>,
    },
    TypingStart(ChatId),
    TypingStop(ChatId),
    SendNotification {
        receiver_id: UserId,
        kind: NotificationKind,
        title: NotificationTitle,
        text: MessageText,
    },
    SessionUpdate {
        session_id: SessionId,
        status: SessionStatus,
        participants: Vec<UserId>,
    },
    UpdatePresence(PresenceStatus),
}

impl ClientCommand {
    /// Wire name of the inbound event
    pub fn name(&self) -> &'static str {
        match self {
            Self::JoinChat(_) => "join_chat",
            Self::LeaveChat(_) => "leave_chat",
            Self::SendMessage { .. } => "send_message",
            Self::TypingStart(_) => "typing_start",
            Self::TypingStop(_) => "typing_stop",
            Self::SendNotification { .. } => "send_notification",
            Self::SessionUpdate { .. } => "session_update",
            Self::UpdatePresence(_) => "update_presence",
        }
    }
}

/// Event pushed to recipient connections
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundEvent {
    NewMessage(ChatMessage),
    UserTyping {
        chat_id: ChatId,
        user_id: UserId,
        email: Email,
    },
    UserStoppedTyping {
        chat_id: ChatId,
        user_id: UserId,
    },
    NewNotification(Notification),
    SessionStatusUpdate(SessionStatusUpdate),
    UserPresenceUpdate(PresenceUpdate),
}

impl OutboundEvent {
    /// Wire name of the outbound event
    pub fn name(&self) -> &'static str {
        match self {
            Self::NewMessage(_) => "new_message",
            Self::UserTyping { .. } => "user_typing",
            Self::UserStoppedTyping { .. } => "user_stopped_typing",
            Self::NewNotification(_) => "new_notification",
            Self::SessionStatusUpdate(_) => "session_status_update",
            Self::UserPresenceUpdate(_) => "user_presence_update",
        }
    }
}
