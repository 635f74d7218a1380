//! UseCase: 入力中インジケーター（typing_start / typing_stop）

use std::sync::Arc;

use crate::domain::{ChannelName, ChatId, Connection, MessagePusher, OutboundEvent, RoomRegistry};

use super::{error::RelayError, event_relay::RelayOutcome, exclude_sender};

/// 入力中状態の中継
pub struct TypingIndicatorUseCase {
    registry: Arc<dyn RoomRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl TypingIndicatorUseCase {
    pub fn new(registry: Arc<dyn RoomRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// `user_typing` をチャットの他の参加者に送る
    pub async fn start(
        &self,
        sender: &Connection,
        chat_id: ChatId,
    ) -> Result<RelayOutcome, RelayError> {
        let event = OutboundEvent::UserTyping {
            chat_id: chat_id.clone(),
            user_id: sender.user_id().clone(),
            email: sender.email().clone(),
        };
        self.relay(sender, &chat_id, event).await
    }

    /// `user_stopped_typing` をチャットの他の参加者に送る
    pub async fn stop(
        &self,
        sender: &Connection,
        chat_id: ChatId,
    ) -> Result<RelayOutcome, RelayError> {
        let event = OutboundEvent::UserStoppedTyping {
            chat_id: chat_id.clone(),
            user_id: sender.user_id().clone(),
        };
        self.relay(sender, &chat_id, event).await
    }

    async fn relay(
        &self,
        sender: &Connection,
        chat_id: &ChatId,
        event: OutboundEvent,
    ) -> Result<RelayOutcome, RelayError> {
        let targets = exclude_sender(
            self.registry.members(&ChannelName::topic(chat_id)).await,
            &sender.id,
        );
        let recipients = self.message_pusher.broadcast(targets, &event).await?;
        tracing::debug!(
            "{} from '{}' in chat '{}' ({} recipient(s))",
            event.name(),
            sender.user_id(),
            chat_id,
            recipients
        );
        Ok(RelayOutcome::Delivered {
            event: event.name(),
            recipients,
        })
    }
}
