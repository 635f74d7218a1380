//! UseCase: イベント中継（受信コマンドの振り分け）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - EventRelay::dispatch() メソッド
//! - 接続状態の確認と、各ユースケースへの振り分け
//!
//! ### なぜこのテストが必要か
//! - Active でない接続（未登録・切断処理中）からのコマンドが中継されないことを保証
//! - 参加・送信・離脱を通した一連の流れで、所属の変化が配送に反映されることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：C1 に参加した 2 人のメッセージ交換
//! - エッジケース：誰も参加していないチャンネルへの送信
//! - 異常系：Closing 状態・未登録の接続からのコマンド

use std::sync::Arc;

use skillsync_shared::time::Clock;

use crate::domain::{ChatId, ClientCommand, ConnectionId, MessagePusher, RoomRegistry};

use super::{
    ChatMembershipUseCase, SendMessageUseCase, SendNotificationUseCase, SessionUpdateUseCase,
    TypingIndicatorUseCase, UpdatePresenceUseCase, error::RelayError,
};

/// コマンドを処理した結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// join_chat の結果（`changed` は所属が新たに追加されたか）
    Joined { chat_id: ChatId, changed: bool },
    /// leave_chat の結果（`changed` は所属が実際に外れたか）
    Left { chat_id: ChatId, changed: bool },
    /// 送信したイベント名と、実際に届けた接続数
    Delivered {
        event: &'static str,
        recipients: usize,
    },
}

/// Active な接続から届いたコマンドを各ユースケースに振り分ける
pub struct EventRelay {
    registry: Arc<dyn RoomRegistry>,
    membership: ChatMembershipUseCase,
    send_message: SendMessageUseCase,
    typing: TypingIndicatorUseCase,
    send_notification: SendNotificationUseCase,
    session_update: SessionUpdateUseCase,
    update_presence: UpdatePresenceUseCase,
}

impl EventRelay {
    pub fn new(
        registry: Arc<dyn RoomRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            membership: ChatMembershipUseCase::new(registry.clone()),
            send_message: SendMessageUseCase::new(
                registry.clone(),
                message_pusher.clone(),
                clock.clone(),
            ),
            typing: TypingIndicatorUseCase::new(registry.clone(), message_pusher.clone()),
            send_notification: SendNotificationUseCase::new(
                registry.clone(),
                message_pusher.clone(),
                clock.clone(),
            ),
            session_update: SessionUpdateUseCase::new(
                registry.clone(),
                message_pusher.clone(),
                clock.clone(),
            ),
            update_presence: UpdatePresenceUseCase::new(registry.clone(), message_pusher, clock),
            registry,
        }
    }

    /// コマンドを処理する
    ///
    /// # Returns
    ///
    /// * `Ok(RelayOutcome)` - 処理結果
    /// * `Err(RelayError::NotActive)` - 接続が未登録、または切断処理中
    /// * `Err(RelayError)` - その他の失敗
    pub async fn dispatch(
        &self,
        connection_id: &ConnectionId,
        command: ClientCommand,
    ) -> Result<RelayOutcome, RelayError> {
        let sender = self
            .registry
            .get_connection(connection_id)
            .await
            .filter(|connection| connection.is_active())
            .ok_or_else(|| RelayError::NotActive(connection_id.to_string()))?;

        tracing::debug!("'{}' from '{}'", command.name(), connection_id);

        match command {
            ClientCommand::JoinChat(chat_id) => self.membership.join(&sender, chat_id).await,
            ClientCommand::LeaveChat(chat_id) => self.membership.leave(&sender, chat_id).await,
            ClientCommand::SendMessage {
                chat_id,
                text,
                receiver_id,
            } => {
                self.send_message
                    .execute(&sender, chat_id, text, receiver_id)
                    .await
            }
            ClientCommand::TypingStart(chat_id) => self.typing.start(&sender, chat_id).await,
            ClientCommand::TypingStop(chat_id) => self.typing.stop(&sender, chat_id).await,
            ClientCommand::SendNotification {
                receiver_id,
                kind,
                title,
                text,
            } => {
                self.send_notification
                    .execute(&sender, receiver_id, kind, title, text)
                    .await
            }
            ClientCommand::SessionUpdate {
                session_id,
                status,
                participants,
            } => {
                self.session_update
                    .execute(&sender, session_id, status, participants)
                    .await
            }
            ClientCommand::UpdatePresence(status) => {
                self.update_presence.execute(&sender, status).await
            }
        }
    }
}
