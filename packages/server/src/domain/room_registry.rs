//! RoomRegistry trait 定義
//!
//! 接続ごとの個人チャンネル・トピックチャンネルの所属を管理するインターフェース。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! 個人チャンネルへの参加は `register` でのみ行われ、`join_topic` / `leave_topic` は
//! トピックチャンネルしか扱わないため、トピック操作が個人チャンネルの所属を変えることはない。

use async_trait::async_trait;

use super::{
    entity::Connection,
    error::RegistryError,
    value_object::{ChannelName, ChatId, ConnectionId},
};

/// Channel membership registry
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomRegistry: Send + Sync {
    /// 接続を登録し、個人チャンネルに参加させる
    async fn register(&self, connection: Connection) -> Result<(), RegistryError>;

    /// 接続を登録解除し、全てのチャンネルから外す
    async fn unregister(&self, connection_id: &ConnectionId) -> Option<Connection>;

    /// 接続を Closing 状態にする
    async fn mark_closing(&self, connection_id: &ConnectionId) -> Result<(), RegistryError>;

    /// 接続を取得
    async fn get_connection(&self, connection_id: &ConnectionId) -> Option<Connection>;

    /// トピックチャンネルに参加（既に参加済みなら `false`）
    async fn join_topic(
        &self,
        connection_id: &ConnectionId,
        chat_id: ChatId,
    ) -> Result<bool, RegistryError>;

    /// トピックチャンネルから離脱（参加していなければ `false`）
    async fn leave_topic(
        &self,
        connection_id: &ConnectionId,
        chat_id: &ChatId,
    ) -> Result<bool, RegistryError>;

    /// チャンネルに現在参加している接続
    async fn members(&self, channel: &ChannelName) -> Vec<ConnectionId>;

    /// 登録済みの全ての接続
    async fn all_connection_ids(&self) -> Vec<ConnectionId>;

    /// 登録済みの接続数
    async fn count_connections(&self) -> usize;
}
