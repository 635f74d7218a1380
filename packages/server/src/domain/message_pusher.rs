//! MessagePusher trait 定義
//!
//! 接続中のクライアントへイベントを送信するためのインターフェース。
//! UseCase 層はこの trait に依存し、WebSocket などの具体的な送信手段には依存しない。
//! 複数プロセスへのファンアウトが必要になった場合も、この trait の裏側で差し替えます。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{error::MessagePushError, event::OutboundEvent, value_object::ConnectionId};

/// Outbound channel of a single connection (serialized frames)
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// Pushes outbound events to connections
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続の送信チャンネルを登録
    async fn register_connection(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// 接続の送信チャンネルを登録解除
    async fn unregister_connection(&self, connection_id: &ConnectionId);

    /// 単一の接続へイベントを送信
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        event: &OutboundEvent,
    ) -> Result<(), MessagePushError>;

    /// 複数の接続へイベントを送信し、実際に送信できた接続数を返す
    ///
    /// 一部の接続への送信失敗は許容する（ログのみ）。
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        event: &OutboundEvent,
    ) -> Result<usize, MessagePushError>;
}
