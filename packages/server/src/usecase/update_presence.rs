//! UseCase: プレゼンス更新の通知

use std::sync::Arc;

use skillsync_shared::time::Clock;

use crate::domain::{
    Connection, MessagePusher, OutboundEvent, PresenceStatus, PresenceUpdate, RoomRegistry,
    Timestamp,
};

use super::{error::RelayError, event_relay::RelayOutcome, exclude_sender};

/// 自分のプレゼンス（online / away / busy）を全接続に知らせる
pub struct UpdatePresenceUseCase {
    registry: Arc<dyn RoomRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl UpdatePresenceUseCase {
    pub fn new(
        registry: Arc<dyn RoomRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
            clock,
        }
    }

    pub async fn execute(
        &self,
        sender: &Connection,
        status: PresenceStatus,
    ) -> Result<RelayOutcome, RelayError> {
        let event = OutboundEvent::UserPresenceUpdate(PresenceUpdate {
            user_id: sender.user_id().clone(),
            status,
            last_seen: Timestamp::new(self.clock.now_millis()),
        });
        let targets = exclude_sender(self.registry.all_connection_ids().await, &sender.id);
        let recipients = self.message_pusher.broadcast(targets, &event).await?;

        tracing::debug!(
            "User '{}' is now '{}' ({} recipient(s))",
            sender.user_id(),
            status,
            recipients
        );
        Ok(RelayOutcome::Delivered {
            event: event.name(),
            recipients,
        })
    }
}
