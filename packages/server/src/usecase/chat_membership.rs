//! UseCase: チャットへの参加・離脱

use std::sync::Arc;

use crate::domain::{ChatId, Connection, RoomRegistry};

use super::{error::RelayError, event_relay::RelayOutcome};

/// トピックチャンネルへの参加・離脱のユースケース
pub struct ChatMembershipUseCase {
    registry: Arc<dyn RoomRegistry>,
}

impl ChatMembershipUseCase {
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self { registry }
    }

    /// `chat_<chat_id>` に参加（join_chat）
    pub async fn join(
        &self,
        connection: &Connection,
        chat_id: ChatId,
    ) -> Result<RelayOutcome, RelayError> {
        let changed = self
            .registry
            .join_topic(&connection.id, chat_id.clone())
            .await?;
        tracing::info!("User '{}' joined chat '{}'", connection.email(), chat_id);
        Ok(RelayOutcome::Joined { chat_id, changed })
    }

    /// `chat_<chat_id>` から離脱（leave_chat）
    pub async fn leave(
        &self,
        connection: &Connection,
        chat_id: ChatId,
    ) -> Result<RelayOutcome, RelayError> {
        let changed = self.registry.leave_topic(&connection.id, &chat_id).await?;
        tracing::info!("User '{}' left chat '{}'", connection.email(), chat_id);
        Ok(RelayOutcome::Left { chat_id, changed })
    }
}
