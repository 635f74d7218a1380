//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続ごとの `UnboundedSender` を管理
//! - `OutboundEvent` を JSON フレームにシリアライズして送信（push_to, broadcast）
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は生成された `UnboundedSender` を受け取り、メッセージ送信に使用します。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    domain::{ConnectionId, MessagePushError, MessagePusher, OutboundEvent, PusherChannel},
    infrastructure::dto::websocket::ServerEvent,
};

/// WebSocket を使った MessagePusher 実装
///
/// ## 使用例
///
/// ```ignore
/// let pusher = WebSocketMessagePusher::new(Arc::new(Mutex::new(HashMap::new())));
/// pusher.register_connection(connection_id.clone(), tx).await;
/// pusher.push_to(&connection_id, &event).await?;
/// ```
pub struct WebSocketMessagePusher {
    /// 接続中のクライアントの WebSocket sender
    ///
    /// Key: connection id
    /// Value: PusherChannel
    connections: Arc<Mutex<HashMap<ConnectionId, PusherChannel>>>,
}

impl WebSocketMessagePusher {
    /// 新しい WebSocketMessagePusher を作成
    pub fn new(connections: Arc<Mutex<HashMap<ConnectionId, PusherChannel>>>) -> Self {
        Self { connections }
    }

    fn encode(event: &OutboundEvent) -> Result<String, MessagePushError> {
        serde_json::to_string(&ServerEvent::from(event))
            .map_err(|e| MessagePushError::Serialization(e.to_string()))
    }
}

impl Default for WebSocketMessagePusher {
    fn default() -> Self {
        Self::new(Arc::new(Mutex::new(HashMap::new())))
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_connection(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let mut connections = self.connections.lock().await;
        tracing::debug!("Connection '{}' registered to MessagePusher", connection_id);
        connections.insert(connection_id, sender);
    }

    async fn unregister_connection(&self, connection_id: &ConnectionId) {
        let mut connections = self.connections.lock().await;
        connections.remove(connection_id);
        tracing::debug!(
            "Connection '{}' unregistered from MessagePusher",
            connection_id
        );
    }

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        event: &OutboundEvent,
    ) -> Result<(), MessagePushError> {
        let frame = Self::encode(event)?;
        let connections = self.connections.lock().await;

        let sender = connections
            .get(connection_id)
            .ok_or_else(|| MessagePushError::ConnectionNotFound(connection_id.to_string()))?;
        sender
            .send(frame)
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        tracing::debug!("Pushed {} to connection '{}'", event.name(), connection_id);
        Ok(())
    }

    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        event: &OutboundEvent,
    ) -> Result<usize, MessagePushError> {
        if targets.is_empty() {
            return Ok(0);
        }

        let frame = Self::encode(event)?;
        let connections = self.connections.lock().await;
        let mut delivered = 0;

        for target in targets {
            match connections.get(&target) {
                // ブロードキャストでは一部の送信失敗を許容
                Some(sender) => match sender.send(frame.clone()) {
                    Ok(()) => {
                        delivered += 1;
                        tracing::debug!("Broadcasted {} to connection '{}'", event.name(), target);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to push {} to connection '{}': {}", event.name(), target, e);
                    }
                },
                None => {
                    tracing::warn!(
                        "Connection '{}' not found during broadcast, skipping",
                        target
                    );
                }
            }
        }

        Ok(delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PresenceStatus, PresenceUpdate, Timestamp, UserId};
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - push_to: 特定の接続への送信
    // - broadcast: 複数接続への送信と送信数
    // - エラーハンドリング（存在しない接続）
    // ========================================

    fn create_test_pusher() -> (
        WebSocketMessagePusher,
        Arc<Mutex<HashMap<ConnectionId, PusherChannel>>>,
    ) {
        let connections = Arc::new(Mutex::new(HashMap::new()));
        let pusher = WebSocketMessagePusher::new(connections.clone());
        (pusher, connections)
    }

    fn presence_event() -> OutboundEvent {
        OutboundEvent::UserPresenceUpdate(PresenceUpdate {
            user_id: UserId::try_from("u1").unwrap(),
            status: PresenceStatus::Away,
            last_seen: Timestamp::new(1672531200000),
        })
    }

    fn conn(id: &str) -> ConnectionId {
        ConnectionId::try_from(id).unwrap()
    }

    #[tokio::test]
    async fn test_push_to_success() {
        // テスト項目: 特定の接続にイベントを JSON フレームとして送信できる
        // given (前提条件):
        let (pusher, _connections) = create_test_pusher();
        let (tx, mut rx) = mpsc::unbounded_channel();
        pusher.register_connection(conn("a"), tx).await;

        // when (操作):
        let result = pusher.push_to(&conn("a"), &presence_event()).await;

        // then (期待する結果):
        assert!(result.is_ok());
        let frame: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(frame["event"], "user_presence_update");
        assert_eq!(frame["data"]["userId"], "u1");
        assert_eq!(frame["data"]["status"], "away");
        assert_eq!(frame["data"]["lastSeen"], "2023-01-01T00:00:00.000Z");
    }

    #[tokio::test]
    async fn test_push_to_connection_not_found() {
        // テスト項目: 存在しない接続への送信はエラーを返す
        // given (前提条件):
        let (pusher, _connections) = create_test_pusher();

        // when (操作):
        let result = pusher.push_to(&conn("ghost"), &presence_event()).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(MessagePushError::ConnectionNotFound("ghost".to_string()))
        );
    }

    #[tokio::test]
    async fn test_broadcast_counts_delivered_connections() {
        // テスト項目: ブロードキャストで実際に送信できた接続数が返される
        // given (前提条件):
        let (pusher, connections) = create_test_pusher();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        {
            let mut lock = connections.lock().await;
            lock.insert(conn("a"), tx1);
            lock.insert(conn("b"), tx2);
        }

        // when (操作):
        let result = pusher
            .broadcast(vec![conn("a"), conn("b"), conn("ghost")], &presence_event())
            .await;

        // then (期待する結果): 存在しない接続はスキップされる
        assert_eq!(result, Ok(2));
        assert!(rx1.recv().await.is_some());
        assert!(rx2.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_broadcast_skips_closed_receiver() {
        // テスト項目: 受信側が閉じた接続への送信失敗は許容される
        // given (前提条件):
        let (pusher, _connections) = create_test_pusher();
        let (tx, rx) = mpsc::unbounded_channel();
        pusher.register_connection(conn("a"), tx).await;
        drop(rx);

        // when (操作):
        let result = pusher.broadcast(vec![conn("a")], &presence_event()).await;

        // then (期待する結果):
        assert_eq!(result, Ok(0));
    }

    #[tokio::test]
    async fn test_broadcast_empty_targets() {
        // テスト項目: 空のターゲットリストでもエラーにならない
        // given (前提条件):
        let (pusher, _connections) = create_test_pusher();

        // when (操作):
        let result = pusher.broadcast(vec![], &presence_event()).await;

        // then (期待する結果):
        assert_eq!(result, Ok(0));
    }

    #[tokio::test]
    async fn test_unregister_connection() {
        // テスト項目: 登録解除した接続には送信できない
        // given (前提条件):
        let (pusher, connections) = create_test_pusher();
        let (tx, _rx) = mpsc::unbounded_channel();
        pusher.register_connection(conn("a"), tx).await;

        // when (操作):
        pusher.unregister_connection(&conn("a")).await;

        // then (期待する結果):
        assert!(connections.lock().await.is_empty());
    }
}
