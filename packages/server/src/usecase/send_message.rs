//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - ブロードキャスト対象の選定（送信元の接続を除く）と、直接宛先への追加送信
//!
//! ### なぜこのテストが必要か
//! - トピックの参加者 N 人にちょうど N 件の new_message が届くことを保証
//! - 直接宛先にはトピック参加の有無に関係なく 1 件追加で届くことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：トピックへの送信
//! - エッジケース：誰も参加していないチャンネルへの送信（黙って破棄）
//! - エッジケース：直接宛先がトピックにも参加している場合

use std::sync::Arc;

use skillsync_shared::time::Clock;

use crate::domain::{
    ChannelName, ChatId, ChatMessage, Connection, ConnectionId, MessageIdFactory, MessagePusher,
    MessageText, OutboundEvent, RoomRegistry, Timestamp, UserId,
};

use super::{error::RelayError, event_relay::RelayOutcome, exclude_sender};

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// RoomRegistry（チャンネル所属管理の抽象化）
    registry: Arc<dyn RoomRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
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

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `sender` - 送信元の接続
    /// * `chat_id` - 送信先のチャット
    /// * `text` - メッセージ本文
    /// * `receiver_id` - 直接宛先（指定時はその個人チャンネルにも送信）
    ///
    /// # Returns
    ///
    /// * `Ok(RelayOutcome::Delivered)` - 実際に送信した接続数
    /// * `Err(RelayError)` - 送信失敗
    pub async fn execute(
        &self,
        sender: &Connection,
        chat_id: ChatId,
        text: MessageText,
        receiver_id: Option<UserId>,
    ) -> Result<RelayOutcome, RelayError> {
        let now = Timestamp::new(self.clock.now_millis());
        let message = ChatMessage {
            id: MessageIdFactory::generate(now),
            sender_id: sender.user_id().clone(),
            sender_email: sender.email().clone(),
            text,
            chat_id: chat_id.clone(),
            receiver_id: receiver_id.clone(),
            timestamp: now,
        };
        let message_id = message.id.clone();
        let event = OutboundEvent::NewMessage(message);

        // 1. トピックチャンネルへ送信（送信元の接続を除く）
        let topic_targets = self.get_broadcast_targets(&ChannelName::topic(&chat_id), sender).await;
        let mut recipients = self
            .message_pusher
            .broadcast(topic_targets, &event)
            .await?;

        // 2. 直接宛先の個人チャンネルへ追加で送信
        if let Some(receiver_id) = &receiver_id {
            let direct_targets = self
                .get_broadcast_targets(&ChannelName::personal(receiver_id), sender)
                .await;
            recipients += self
                .message_pusher
                .broadcast(direct_targets, &event)
                .await?;
        }

        tracing::info!(
            "Message '{}' from '{}' relayed to chat '{}' ({} recipient(s))",
            message_id,
            sender.user_id(),
            chat_id,
            recipients
        );
        Ok(RelayOutcome::Delivered {
            event: event.name(),
            recipients,
        })
    }

    /// チャンネルの参加者のうち、送信元の接続以外
    async fn get_broadcast_targets(
        &self,
        channel: &ChannelName,
        sender: &Connection,
    ) -> Vec<ConnectionId> {
        exclude_sender(self.registry.members(channel).await, &sender.id)
    }
}
