//! Server state shared by all handlers.

use std::sync::Arc;

use skillsync_shared::time::Clock;
use tokio::sync::watch;

use crate::{
    domain::{MessagePusher, RoomRegistry, TokenVerifier},
    usecase::{ConnectUserUseCase, DisconnectUserUseCase, EventRelay},
};

/// Shared application state
pub struct AppState {
    /// ConnectUserUseCase（認証と接続登録のユースケース）
    pub connect_user_usecase: Arc<ConnectUserUseCase>,
    /// DisconnectUserUseCase（切断処理のユースケース）
    pub disconnect_user_usecase: Arc<DisconnectUserUseCase>,
    /// EventRelay（受信イベントの中継）
    pub event_relay: Arc<EventRelay>,
    /// true になったら全ソケットを閉じる
    shutdown: watch::Sender<bool>,
}

impl AppState {
    /// Wire the use cases around one registry, pusher, verifier and clock.
    pub fn new(
        verifier: Arc<dyn TokenVerifier>,
        registry: Arc<dyn RoomRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let connect_user_usecase = Arc::new(ConnectUserUseCase::new(
            verifier,
            registry.clone(),
            message_pusher.clone(),
            clock.clone(),
        ));
        let disconnect_user_usecase = Arc::new(DisconnectUserUseCase::new(
            registry.clone(),
            message_pusher.clone(),
            clock.clone(),
        ));
        let event_relay = Arc::new(EventRelay::new(registry, message_pusher, clock));
        let (shutdown, _) = watch::channel(false);

        Self {
            connect_user_usecase,
            disconnect_user_usecase,
            event_relay,
            shutdown,
        }
    }

    pub fn subscribe_shutdown(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    /// Ask every open socket to close.
    pub fn begin_shutdown(&self) {
        self.shutdown.send_replace(true);
    }
}
