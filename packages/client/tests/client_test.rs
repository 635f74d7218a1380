//! Integration tests for the chat client against an in-process relay.

use std::{sync::Arc, time::Duration};

use skillsync_client::{error::ClientError, run_client};
use skillsync_server::{
    config::ServerConfig,
    infrastructure::{
        auth::JwtTokenVerifier, message_pusher::WebSocketMessagePusher,
        registry::InMemoryRoomRegistry,
    },
    ui::{AppState, Server},
};
use skillsync_shared::time::SystemClock;
use tokio::net::TcpListener;

const SECRET: &str = "integration_test_secret_with_at_least_32_bytes";

/// Start a relay on an ephemeral port and return its WebSocket URL
async fn start_server() -> String {
    let config = ServerConfig::new("127.0.0.1", 0, SECRET, "*").unwrap();
    let state = Arc::new(AppState::new(
        Arc::new(JwtTokenVerifier::new(SECRET).unwrap()),
        Arc::new(InMemoryRoomRegistry::new()),
        Arc::new(WebSocketMessagePusher::default()),
        Arc::new(SystemClock),
    ));
    let server = Server::new(state, &config);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}/ws", listener.local_addr().unwrap());
    tokio::spawn(async move {
        let _ = server.serve(listener).await;
    });
    url
}

#[tokio::test]
async fn test_rejected_token_exits_without_reconnecting() {
    // テスト項目: 401 で拒否された場合、再接続せずに Unauthorized で終了する
    // given (前提条件):
    let url = start_server().await;

    // when (操作): 再接続していれば 5 秒以上かかる
    let result = tokio::time::timeout(
        Duration::from_secs(3),
        run_client(url, "not-a-valid-token".to_string()),
    )
    .await
    .expect("Client should exit without waiting to reconnect");

    // then (期待する結果):
    assert!(matches!(result, Err(ClientError::Unauthorized(_))));
}
