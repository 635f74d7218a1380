//! InMemory Room Registry 実装
//!
//! ドメイン層が定義する RoomRegistry trait の具体的な実装。
//! HashMap をインメモリのメンバーシップテーブルとして使用します。
//!
//! 接続テーブルとチャンネルテーブルは 1 つの Mutex で保護しており、
//! 1 回の操作の中で両者が食い違うことはありません。

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ChannelName, ChatId, Connection, ConnectionId, ConnectionState, RegistryError, RoomRegistry,
};

#[derive(Default)]
struct Tables {
    connections: HashMap<ConnectionId, Connection>,
    channels: HashMap<ChannelName, HashSet<ConnectionId>>,
}

impl Tables {
    fn add_member(&mut self, channel: ChannelName, connection_id: &ConnectionId) -> bool {
        self.channels
            .entry(channel)
            .or_default()
            .insert(connection_id.clone())
    }

    fn remove_member(&mut self, channel: &ChannelName, connection_id: &ConnectionId) -> bool {
        let Some(members) = self.channels.get_mut(channel) else {
            return false;
        };
        let removed = members.remove(connection_id);
        if members.is_empty() {
            self.channels.remove(channel);
        }
        removed
    }
}

/// インメモリ Room Registry 実装
///
/// プロセス起動時に生成され、`Arc` で UseCase に注入されます。
#[derive(Default)]
pub struct InMemoryRoomRegistry {
    tables: Mutex<Tables>,
}

impl InMemoryRoomRegistry {
    /// 新しい InMemoryRoomRegistry を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 現在存在するチャンネル数（メンバーがいないチャンネルは保持しない）
    pub async fn count_channels(&self) -> usize {
        self.tables.lock().await.channels.len()
    }
}

#[async_trait]
impl RoomRegistry for InMemoryRoomRegistry {
    async fn register(&self, connection: Connection) -> Result<(), RegistryError> {
        let mut tables = self.tables.lock().await;
        if tables.connections.contains_key(&connection.id) {
            return Err(RegistryError::DuplicateConnection(
                connection.id.as_str().to_string(),
            ));
        }

        for channel in connection.channels() {
            tables.add_member(channel, &connection.id);
        }
        tracing::debug!(
            "Connection '{}' registered to {}",
            connection.id,
            connection.identity().personal_channel()
        );
        tables.connections.insert(connection.id.clone(), connection);
        Ok(())
    }

    async fn unregister(&self, connection_id: &ConnectionId) -> Option<Connection> {
        let mut tables = self.tables.lock().await;
        let connection = tables.connections.remove(connection_id)?;
        for channel in connection.channels() {
            tables.remove_member(&channel, connection_id);
        }
        tracing::debug!("Connection '{}' unregistered", connection_id);
        Some(connection)
    }

    async fn mark_closing(&self, connection_id: &ConnectionId) -> Result<(), RegistryError> {
        let mut tables = self.tables.lock().await;
        let connection = tables
            .connections
            .get_mut(connection_id)
            .ok_or_else(|| RegistryError::ConnectionNotFound(connection_id.to_string()))?;
        connection.state = ConnectionState::Closing;
        Ok(())
    }

    async fn get_connection(&self, connection_id: &ConnectionId) -> Option<Connection> {
        let tables = self.tables.lock().await;
        tables.connections.get(connection_id).cloned()
    }

    async fn join_topic(
        &self,
        connection_id: &ConnectionId,
        chat_id: ChatId,
    ) -> Result<bool, RegistryError> {
        let mut tables = self.tables.lock().await;
        let connection = tables
            .connections
            .get_mut(connection_id)
            .ok_or_else(|| RegistryError::ConnectionNotFound(connection_id.to_string()))?;
        if !connection.topics.insert(chat_id.clone()) {
            return Ok(false);
        }
        tables.add_member(ChannelName::Topic(chat_id), connection_id);
        Ok(true)
    }

    async fn leave_topic(
        &self,
        connection_id: &ConnectionId,
        chat_id: &ChatId,
    ) -> Result<bool, RegistryError> {
        let mut tables = self.tables.lock().await;
        let connection = tables
            .connections
            .get_mut(connection_id)
            .ok_or_else(|| RegistryError::ConnectionNotFound(connection_id.to_string()))?;
        if !connection.topics.remove(chat_id) {
            return Ok(false);
        }
        tables.remove_member(&ChannelName::topic(chat_id), connection_id);
        Ok(true)
    }

    async fn members(&self, channel: &ChannelName) -> Vec<ConnectionId> {
        let tables = self.tables.lock().await;
        tables
            .channels
            .get(channel)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }

    async fn all_connection_ids(&self) -> Vec<ConnectionId> {
        let tables = self.tables.lock().await;
        tables.connections.keys().cloned().collect()
    }

    async fn count_connections(&self) -> usize {
        self.tables.lock().await.connections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Email, Identity, Timestamp, UserId};

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - 接続の登録・登録解除と個人チャンネルへの自動参加
    // - トピックチャンネルへの参加・離脱
    // - join/leave の繰り返し後のメンバーシップ
    //
    // 【なぜこのテストが必要か】
    // - Registry はブロードキャスト先を決める中核
    // - 接続テーブルとチャンネルテーブルの整合性を保証する必要がある
    // ========================================

    fn connection(connection_id: &str, user_id: &str) -> Connection {
        Connection::new(
            ConnectionId::try_from(connection_id).unwrap(),
            Identity::new(
                UserId::try_from(user_id).unwrap(),
                Email::new(format!("{}@example.com", user_id)).unwrap(),
            ),
            Timestamp::new(1000),
        )
    }

    fn chat(id: &str) -> ChatId {
        ChatId::try_from(id).unwrap()
    }

    #[tokio::test]
    async fn test_register_joins_personal_channel() {
        // テスト項目: 登録した接続は個人チャンネルのメンバーになる
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();
        let conn = connection("conn-a", "u1");

        // when (操作):
        registry.register(conn.clone()).await.unwrap();

        // then (期待する結果):
        let members = registry
            .members(&conn.identity().personal_channel())
            .await;
        assert_eq!(members, vec![conn.id.clone()]);
        assert_eq!(registry.count_connections().await, 1);
        assert_eq!(registry.count_channels().await, 1);
    }

    #[tokio::test]
    async fn test_register_duplicate_connection_fails() {
        // テスト項目: 同じ接続 ID の二重登録はエラーになる
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();
        registry.register(connection("conn-a", "u1")).await.unwrap();

        // when (操作):
        let result = registry.register(connection("conn-a", "u2")).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(RegistryError::DuplicateConnection("conn-a".to_string()))
        );
    }

    #[tokio::test]
    async fn test_same_user_connections_share_personal_channel() {
        // テスト項目: 同じユーザーの複数接続は同じ個人チャンネルに所属する
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();
        let first = connection("conn-a", "u1");
        let second = connection("conn-b", "u1");

        // when (操作):
        registry.register(first.clone()).await.unwrap();
        registry.register(second.clone()).await.unwrap();

        // then (期待する結果):
        let mut members = registry
            .members(&first.identity().personal_channel())
            .await;
        members.sort();
        assert_eq!(members, vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn test_join_and_leave_topic() {
        // テスト項目: トピックへの参加・離脱がメンバーシップに反映される
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();
        let conn = connection("conn-a", "u1");
        registry.register(conn.clone()).await.unwrap();

        // when (操作):
        let joined = registry.join_topic(&conn.id, chat("c1")).await.unwrap();
        let joined_again = registry.join_topic(&conn.id, chat("c1")).await.unwrap();

        // then (期待する結果):
        assert!(joined);
        assert!(!joined_again);
        assert_eq!(
            registry.members(&ChannelName::topic(&chat("c1"))).await,
            vec![conn.id.clone()]
        );

        // when (操作):
        let left = registry.leave_topic(&conn.id, &chat("c1")).await.unwrap();
        let left_again = registry.leave_topic(&conn.id, &chat("c1")).await.unwrap();

        // then (期待する結果):
        assert!(left);
        assert!(!left_again);
        assert!(
            registry
                .members(&ChannelName::topic(&chat("c1")))
                .await
                .is_empty()
        );
        // 個人チャンネルの所属は変わらない
        assert_eq!(
            registry
                .members(&conn.identity().personal_channel())
                .await,
            vec![conn.id.clone()]
        );
    }

    #[tokio::test]
    async fn test_membership_matches_last_operation_per_channel() {
        // テスト項目: join/leave を繰り返した結果が各チャンネルの最後の操作と一致する
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();
        let conn = connection("conn-a", "u1");
        registry.register(conn.clone()).await.unwrap();
        let operations = [
            ("c1", true),
            ("c2", true),
            ("c1", false),
            ("c3", true),
            ("c2", false),
            ("c2", true),
            ("c3", false),
            ("c3", false),
            ("c1", true),
        ];

        // when (操作):
        for (chat_id, join) in operations {
            if join {
                registry.join_topic(&conn.id, chat(chat_id)).await.unwrap();
            } else {
                registry.leave_topic(&conn.id, &chat(chat_id)).await.unwrap();
            }
        }

        // then (期待する結果): c1, c2 に参加、c3 からは離脱
        let stored = registry.get_connection(&conn.id).await.unwrap();
        let topics: Vec<&str> = stored.topics.iter().map(|c| c.as_str()).collect();
        assert_eq!(topics, vec!["c1", "c2"]);
        for (chat_id, expected) in [("c1", true), ("c2", true), ("c3", false)] {
            let members = registry.members(&ChannelName::topic(&chat(chat_id))).await;
            assert_eq!(members.contains(&conn.id), expected, "chat {}", chat_id);
        }
    }

    #[tokio::test]
    async fn test_join_topic_unknown_connection() {
        // テスト項目: 未登録の接続はトピックに参加できない
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();
        let unknown = ConnectionId::try_from("ghost").unwrap();

        // when (操作):
        let result = registry.join_topic(&unknown, chat("c1")).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(RegistryError::ConnectionNotFound("ghost".to_string()))
        );
    }

    #[tokio::test]
    async fn test_unregister_removes_all_memberships() {
        // テスト項目: 登録解除すると全てのチャンネルから外れ、空のチャンネルは削除される
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();
        let conn = connection("conn-a", "u1");
        registry.register(conn.clone()).await.unwrap();
        registry.join_topic(&conn.id, chat("c1")).await.unwrap();
        registry.join_topic(&conn.id, chat("c2")).await.unwrap();

        // when (操作):
        let removed = registry.unregister(&conn.id).await;

        // then (期待する結果):
        assert_eq!(removed.map(|c| c.topics.len()), Some(2));
        assert_eq!(registry.count_connections().await, 0);
        assert_eq!(registry.count_channels().await, 0);
        assert!(registry.unregister(&conn.id).await.is_none());
    }

    #[tokio::test]
    async fn test_mark_closing_deactivates_connection() {
        // テスト項目: mark_closing 後の接続は Active ではなくなる
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();
        let conn = connection("conn-a", "u1");
        registry.register(conn.clone()).await.unwrap();

        // when (操作):
        registry.mark_closing(&conn.id).await.unwrap();

        // then (期待する結果):
        let stored = registry.get_connection(&conn.id).await.unwrap();
        assert_eq!(stored.state, ConnectionState::Closing);
        assert!(!stored.is_active());
    }
}
