//! UseCase: ユーザー切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectUserUseCase::execute() メソッド
//! - 切断時のチャンネル離脱と offline presence のブロードキャスト
//!
//! ### なぜこのテストが必要か
//! - 切断した接続がどのチャンネルにも残らないことを保証
//! - 残りの全接続にちょうど 1 回 offline が通知されることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：切断と通知
//! - エッジケース：最後の接続の切断（通知対象なし）
//! - 異常系：存在しない接続の切断試行

use std::sync::Arc;

use skillsync_shared::time::Clock;

use crate::domain::{
    ConnectionId, MessagePusher, OutboundEvent, PresenceStatus, PresenceUpdate, RoomRegistry,
    Timestamp,
};

use super::error::DisconnectError;

/// ユーザー切断のユースケース
pub struct DisconnectUserUseCase {
    /// RoomRegistry（チャンネル所属管理の抽象化）
    registry: Arc<dyn RoomRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl DisconnectUserUseCase {
    /// 新しい DisconnectUserUseCase を作成
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

    /// 切断を実行
    ///
    /// 1. 接続を Closing にする（以降のイベントは中継されない）
    /// 2. MessagePusher と Registry から登録解除する
    /// 3. 残りの全接続に offline の presence を通知する
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ConnectionId>)` - offline を通知した接続
    /// * `Err(DisconnectError)` - 切断失敗
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<Vec<ConnectionId>, DisconnectError> {
        self.registry
            .mark_closing(connection_id)
            .await
            .map_err(|_| DisconnectError::ConnectionNotFound(connection_id.to_string()))?;

        self.message_pusher
            .unregister_connection(connection_id)
            .await;
        let connection = self
            .registry
            .unregister(connection_id)
            .await
            .ok_or_else(|| DisconnectError::ConnectionNotFound(connection_id.to_string()))?;

        let event = OutboundEvent::UserPresenceUpdate(PresenceUpdate {
            user_id: connection.user_id().clone(),
            status: PresenceStatus::Offline,
            last_seen: Timestamp::new(self.clock.now_millis()),
        });
        let notify_targets = self.registry.all_connection_ids().await;
        self.message_pusher
            .broadcast(notify_targets.clone(), &event)
            .await
            .map_err(|e| DisconnectError::BroadcastFailed(e.to_string()))?;

        tracing::info!(
            "User '{}' disconnected ('{}'), notified {} connection(s)",
            connection.user_id(),
            connection_id,
            notify_targets.len()
        );
        Ok(notify_targets)
    }
}
