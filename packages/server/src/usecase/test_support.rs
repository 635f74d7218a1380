//! UseCase テスト用の共通セットアップ
//!
//! 実際の InMemoryRoomRegistry / WebSocketMessagePusher と FixedClock を組み合わせ、
//! 各接続の送信チャンネルからフレームを取り出して検証します。

use std::sync::Arc;

use skillsync_shared::time::FixedClock;
use tokio::sync::mpsc;

use crate::{
    domain::{
        ChatId, Connection, ConnectionId, Email, Identity, MessagePusher, RoomRegistry, Timestamp,
        UserId,
    },
    infrastructure::{message_pusher::WebSocketMessagePusher, registry::InMemoryRoomRegistry},
};

/// FixedClock が返す時刻
pub(crate) const NOW: i64 = 1_700_000_000_000;

pub(crate) struct Harness {
    pub registry: Arc<InMemoryRoomRegistry>,
    pub pusher: Arc<WebSocketMessagePusher>,
    pub clock: Arc<FixedClock>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(InMemoryRoomRegistry::new()),
            pusher: Arc::new(WebSocketMessagePusher::default()),
            clock: Arc::new(FixedClock::new(NOW)),
        }
    }

    /// 接続を登録し、その接続宛てのフレームを受け取る Receiver を返す
    pub async fn connect(
        &self,
        connection_id: &str,
        user_id: &str,
    ) -> (Connection, mpsc::UnboundedReceiver<String>) {
        let connection = Connection::new(
            ConnectionId::try_from(connection_id).unwrap(),
            identity(user_id),
            Timestamp::new(NOW),
        );
        let (tx, rx) = mpsc::unbounded_channel();
        self.registry.register(connection.clone()).await.unwrap();
        self.pusher
            .register_connection(connection.id.clone(), tx)
            .await;
        (connection, rx)
    }

    /// 登録済みの最新状態（参加中トピックを含む）を取得
    pub async fn reload(&self, connection: &Connection) -> Connection {
        self.registry.get_connection(&connection.id).await.unwrap()
    }
}

pub(crate) fn identity(user_id: &str) -> Identity {
    Identity::new(
        UserId::try_from(user_id).unwrap(),
        Email::new(format!("{}@example.com", user_id)).unwrap(),
    )
}

pub(crate) fn chat(id: &str) -> ChatId {
    ChatId::try_from(id).unwrap()
}

pub(crate) fn user(id: &str) -> UserId {
    UserId::try_from(id).unwrap()
}

/// Receiver に溜まっているフレームを全て取り出して JSON として返す
pub(crate) fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<serde_json::Value> {
    let mut frames = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        frames.push(serde_json::from_str(&frame).unwrap());
    }
    frames
}
