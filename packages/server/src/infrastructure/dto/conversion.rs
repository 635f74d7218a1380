//! Conversion logic between DTOs and domain types.

use skillsync_shared::time::timestamp_to_rfc3339;

use crate::domain::{
    ChatId, ClientCommand, MessageText, NotificationTitle, OutboundEvent, PresenceStatus,
    SessionId, UserId, ValueObjectError,
};
use crate::infrastructure::dto::websocket as dto;

// ========================================
// DTO → Domain
// ========================================

impl TryFrom<dto::ClientEvent> for ClientCommand {
    type Error = ValueObjectError;

    fn try_from(event: dto::ClientEvent) -> Result<Self, Self::Error> {
        let command = match event {
            dto::ClientEvent::JoinChat(chat_id) => Self::JoinChat(ChatId::new(chat_id)?),
            dto::ClientEvent::LeaveChat(chat_id) => Self::LeaveChat(ChatId::new(chat_id)?),
            dto::ClientEvent::SendMessage(payload) => Self::SendMessage {
                chat_id: ChatId::new(payload.chat_id)?,
                text: MessageText::new(payload.message)?,
                receiver_id: payload.receiver_id.map(UserId::new).transpose()?,
            },
            dto::ClientEvent::TypingStart(payload) => {
                Self::TypingStart(ChatId::new(payload.chat_id)?)
            }
            dto::ClientEvent::TypingStop(payload) => Self::TypingStop(ChatId::new(payload.chat_id)?),
            dto::ClientEvent::SendNotification(payload) => Self::SendNotification {
                receiver_id: UserId::new(payload.receiver_id)?,
                kind: payload.kind.parse()?,
                title: NotificationTitle::new(payload.title)?,
                text: MessageText::new(payload.message)?,
            },
            dto::ClientEvent::SessionUpdate(payload) => Self::SessionUpdate {
                session_id: SessionId::new(payload.session_id)?,
                status: payload.status.parse()?,
                participants: payload
                    .participants
                    .into_iter()
                    .map(UserId::new)
                    .collect::<Result<Vec<_>, _>>()?,
            },
            dto::ClientEvent::UpdatePresence(status) => {
                Self::UpdatePresence(PresenceStatus::parse_reported(&status)?)
            }
        };
        Ok(command)
    }
}

// ========================================
// Domain → DTO
// ========================================

impl From<&OutboundEvent> for dto::ServerEvent {
    fn from(event: &OutboundEvent) -> Self {
        match event {
            OutboundEvent::NewMessage(message) => Self::NewMessage(dto::ChatMessageDto {
                id: message.id.to_string(),
                sender_id: message.sender_id.to_string(),
                sender_email: message.sender_email.to_string(),
                message: message.text.to_string(),
                timestamp: timestamp_to_rfc3339(message.timestamp.value()),
                chat_id: message.chat_id.to_string(),
                receiver_id: message.receiver_id.as_ref().map(UserId::to_string),
            }),
            OutboundEvent::UserTyping {
                chat_id,
                user_id,
                email,
            } => Self::UserTyping(dto::UserTypingDto {
                chat_id: chat_id.to_string(),
                user_id: user_id.to_string(),
                user_email: email.to_string(),
            }),
            OutboundEvent::UserStoppedTyping { chat_id, user_id } => {
                Self::UserStoppedTyping(dto::UserStoppedTypingDto {
                    chat_id: chat_id.to_string(),
                    user_id: user_id.to_string(),
                })
            }
            OutboundEvent::NewNotification(notification) => {
                Self::NewNotification(dto::NotificationDto {
                    id: notification.id.to_string(),
                    sender_id: notification.sender_id.to_string(),
                    receiver_id: notification.receiver_id.to_string(),
                    kind: notification.kind.to_string(),
                    title: notification.title.to_string(),
                    message: notification.text.to_string(),
                    timestamp: timestamp_to_rfc3339(notification.timestamp.value()),
                    read: notification.read,
                })
            }
            OutboundEvent::SessionStatusUpdate(update) => {
                Self::SessionStatusUpdate(dto::SessionStatusDto {
                    session_id: update.session_id.to_string(),
                    status: update.status.to_string(),
                    timestamp: timestamp_to_rfc3339(update.timestamp.value()),
                })
            }
            OutboundEvent::UserPresenceUpdate(update) => {
                Self::UserPresenceUpdate(dto::PresenceDto {
                    user_id: update.user_id.to_string(),
                    status: update.status.to_string(),
                    last_seen: timestamp_to_rfc3339(update.last_seen.value()),
                })
            }
        }
    }
}
