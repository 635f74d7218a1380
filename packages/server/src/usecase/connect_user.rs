//! UseCase: ユーザー接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectUserUseCase::authenticate() / execute() メソッド
//! - 認証情報の検証と、個人チャンネルへの自動参加
//!
//! ### なぜこのテストが必要か
//! - 匿名接続を許さないこと（認証失敗時は何も登録されない）を保証
//! - 認証済みの接続がちょうど 1 つの個人チャンネルに所属することを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：有効なトークンでの接続
//! - 異常系：トークンなし・不正なトークン
//! - エッジケース：同じユーザーの複数接続

use std::sync::Arc;

use skillsync_shared::time::Clock;

use crate::domain::{
    AuthError, Connection, ConnectionIdFactory, Identity, MessagePusher, PusherChannel,
    RoomRegistry, Timestamp, TokenVerifier,
};

use super::error::ConnectError;

/// ユーザー接続のユースケース
pub struct ConnectUserUseCase {
    /// TokenVerifier（認証情報検証の抽象化）
    verifier: Arc<dyn TokenVerifier>,
    /// RoomRegistry（チャンネル所属管理の抽象化）
    registry: Arc<dyn RoomRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl ConnectUserUseCase {
    /// 新しい ConnectUserUseCase を作成
    pub fn new(
        verifier: Arc<dyn TokenVerifier>,
        registry: Arc<dyn RoomRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            verifier,
            registry,
            message_pusher,
            clock,
        }
    }

    /// ハンドシェイク時の認証情報を検証
    ///
    /// # Returns
    ///
    /// * `Ok(Identity)` - 認証成功
    /// * `Err(ConnectError::Authentication)` - 認証情報なし・不正・期限切れ
    pub fn authenticate(&self, credential: Option<&str>) -> Result<Identity, ConnectError> {
        let credential = credential.ok_or(AuthError::MissingCredential)?;
        Ok(self.verifier.verify(credential)?)
    }

    /// 認証済みのユーザーを Active な接続として登録
    ///
    /// 接続は個人チャンネル（`user_<id>`）に自動参加し、送信チャンネルが
    /// MessagePusher に登録される。
    ///
    /// # Returns
    ///
    /// * `Ok(Connection)` - 登録された接続
    /// * `Err(ConnectError::Registry)` - 登録失敗
    pub async fn execute(
        &self,
        identity: Identity,
        sender: PusherChannel,
    ) -> Result<Connection, ConnectError> {
        let connection = Connection::new(
            ConnectionIdFactory::generate(),
            identity,
            Timestamp::new(self.clock.now_millis()),
        );

        // 1. MessagePusher に送信チャンネルを登録
        // チャンネルのメンバーには常に送信チャンネルが登録済み
        self.message_pusher
            .register_connection(connection.id.clone(), sender)
            .await;

        // 2. Registry に登録（個人チャンネルへの参加を含む）
        if let Err(e) = self.registry.register(connection.clone()).await {
            self.message_pusher
                .unregister_connection(&connection.id)
                .await;
            return Err(e.into());
        }

        tracing::info!(
            "User '{}' ({}) connected as '{}'",
            connection.user_id(),
            connection.email(),
            connection.id
        );
        Ok(connection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            ChannelName, RegistryError, message_pusher::MockMessagePusher,
            room_registry::MockRoomRegistry, token_verifier::MockTokenVerifier,
        },
        usecase::test_support::{Harness, NOW, identity},
    };
    use mockall::{Sequence, predicate::eq};
    use skillsync_shared::time::FixedClock;

    fn create_usecase(harness: &Harness, verifier: MockTokenVerifier) -> ConnectUserUseCase {
        ConnectUserUseCase::new(
            Arc::new(verifier),
            harness.registry.clone(),
            harness.pusher.clone(),
            harness.clock.clone(),
        )
    }

    #[tokio::test]
    async fn test_authenticate_with_valid_token() {
        // テスト項目: 有効なトークンで Identity が得られる
        // given (前提条件):
        let harness = Harness::new();
        let mut verifier = MockTokenVerifier::new();
        verifier
            .expect_verify()
            .with(eq("valid-token"))
            .times(1)
            .returning(|_| Ok(identity("u1")));
        let usecase = create_usecase(&harness, verifier);

        // when (操作):
        let result = usecase.authenticate(Some("valid-token"));

        // then (期待する結果):
        assert_eq!(result, Ok(identity("u1")));
    }

    #[tokio::test]
    async fn test_authenticate_without_token() {
        // テスト項目: トークンがない場合は Verifier を呼ばずに認証失敗になる
        // given (前提条件):
        let harness = Harness::new();
        let mut verifier = MockTokenVerifier::new();
        verifier.expect_verify().times(0);
        let usecase = create_usecase(&harness, verifier);

        // when (操作):
        let result = usecase.authenticate(None);

        // then (期待する結果):
        assert_eq!(
            result,
            Err(ConnectError::Authentication(AuthError::MissingCredential))
        );
        assert_eq!(harness.registry.count_connections().await, 0);
    }

    #[tokio::test]
    async fn test_authenticate_with_invalid_token() {
        // テスト項目: 不正なトークンは認証失敗になり、何も登録されない
        // given (前提条件):
        let harness = Harness::new();
        let mut verifier = MockTokenVerifier::new();
        verifier
            .expect_verify()
            .returning(|_| Err(AuthError::InvalidSignature));
        let usecase = create_usecase(&harness, verifier);

        // when (操作):
        let result = usecase.authenticate(Some("forged"));

        // then (期待する結果):
        assert_eq!(
            result,
            Err(ConnectError::Authentication(AuthError::InvalidSignature))
        );
        assert_eq!(harness.registry.count_connections().await, 0);
    }

    #[tokio::test]
    async fn test_execute_joins_personal_channel() {
        // テスト項目: 接続は Active になり、個人チャンネルだけに所属する
        // given (前提条件):
        let harness = Harness::new();
        let usecase = create_usecase(&harness, MockTokenVerifier::new());
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();

        // when (操作):
        let connection = usecase.execute(identity("u1"), tx).await.unwrap();

        // then (期待する結果):
        assert!(connection.is_active());
        assert!(connection.topics.is_empty());
        assert_eq!(connection.connected_at, Timestamp::new(NOW));
        let personal = ChannelName::personal(connection.user_id());
        assert_eq!(personal.to_string(), "user_u1");
        assert_eq!(
            harness.registry.members(&personal).await,
            vec![connection.id.clone()]
        );
        assert_eq!(connection.channels(), vec![personal]);
    }

    #[tokio::test]
    async fn test_execute_same_user_twice() {
        // テスト項目: 同じユーザーが複数接続すると、別々の接続 ID で同じ個人チャンネルに入る
        // given (前提条件):
        let harness = Harness::new();
        let usecase = create_usecase(&harness, MockTokenVerifier::new());
        let (tx1, _rx1) = tokio::sync::mpsc::unbounded_channel();
        let (tx2, _rx2) = tokio::sync::mpsc::unbounded_channel();

        // when (操作):
        let first = usecase.execute(identity("u1"), tx1).await.unwrap();
        let second = usecase.execute(identity("u1"), tx2).await.unwrap();

        // then (期待する結果):
        assert_ne!(first.id, second.id);
        let members = harness
            .registry
            .members(&ChannelName::personal(first.user_id()))
            .await;
        assert_eq!(members.len(), 2);
        assert_eq!(harness.registry.count_connections().await, 2);
    }

    #[tokio::test]
    async fn test_execute_registers_sender_before_joining_personal_channel() {
        // テスト項目: 送信チャンネルの登録が個人チャンネルへの参加より先に行われる
        // given (前提条件):
        let mut seq = Sequence::new();
        let mut pusher = MockMessagePusher::new();
        let mut registry = MockRoomRegistry::new();
        pusher
            .expect_register_connection()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| ());
        registry
            .expect_register()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        pusher.expect_unregister_connection().times(0);
        let usecase = ConnectUserUseCase::new(
            Arc::new(MockTokenVerifier::new()),
            Arc::new(registry),
            Arc::new(pusher),
            Arc::new(FixedClock::new(NOW)),
        );
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();

        // when (操作):
        let result = usecase.execute(identity("u1"), tx).await;

        // then (期待する結果):
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_execute_unregisters_sender_when_registry_fails() {
        // テスト項目: Registry への登録に失敗した場合、送信チャンネルの登録も取り消される
        // given (前提条件):
        let mut pusher = MockMessagePusher::new();
        let mut registry = MockRoomRegistry::new();
        pusher
            .expect_register_connection()
            .times(1)
            .returning(|_, _| ());
        registry
            .expect_register()
            .times(1)
            .returning(|connection| {
                Err(RegistryError::DuplicateConnection(connection.id.to_string()))
            });
        pusher
            .expect_unregister_connection()
            .times(1)
            .returning(|_| ());
        let usecase = ConnectUserUseCase::new(
            Arc::new(MockTokenVerifier::new()),
            Arc::new(registry),
            Arc::new(pusher),
            Arc::new(FixedClock::new(NOW)),
        );
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();

        // when (操作):
        let result = usecase.execute(identity("u1"), tx).await;

        // then (期待する結果):
        assert!(matches!(
            result,
            Err(ConnectError::Registry(RegistryError::DuplicateConnection(_)))
        ));
    }
}
