//! UseCase 層のエラー型

use thiserror::Error;

use crate::domain::{AuthError, MessagePushError, RegistryError, ValueObjectError};

/// 接続処理のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    /// 認証失敗（認証情報なし・不正・期限切れ）
    #[error(transparent)]
    Authentication(#[from] AuthError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// 切断処理のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisconnectError {
    #[error("Connection '{0}' not found")]
    ConnectionNotFound(String),

    #[error("Failed to broadcast offline presence: {0}")]
    BroadcastFailed(String),
}

/// イベント中継のエラー
///
/// `NotActive` 以外は該当イベントのみを破棄し、接続は維持する。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// 接続が Active でない（未登録・切断処理中）
    #[error("Connection '{0}' is not active")]
    NotActive(String),

    /// ペイロード不正（必須フィールド欠落・未知の列挙値など）
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Push(#[from] MessagePushError),
}

impl RelayError {
    /// この接続のイベント処理を終了すべきエラーか
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::NotActive(_))
    }
}

impl From<ValueObjectError> for RelayError {
    fn from(e: ValueObjectError) -> Self {
        Self::InvalidPayload(e.to_string())
    }
}
