//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use tokio::sync::{mpsc, watch};

use crate::{
    domain::{ClientCommand, ConnectionId, Identity},
    infrastructure::dto::websocket::ClientEvent,
    ui::state::AppState,
    usecase::RelayError,
};

/// Query parameters for WebSocket connection
#[derive(Debug, Default, Deserialize)]
pub struct ConnectQuery {
    /// Fallback for clients that cannot set an `Authorization` header
    pub token: Option<String>,
}

/// Authenticates the handshake, then upgrades.
///
/// Nothing is registered for a rejected handshake.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, StatusCode> {
    let credential = extract_credential(&headers, &query);

    let identity = match state
        .connect_user_usecase
        .authenticate(credential.as_deref())
    {
        Ok(identity) => identity,
        Err(e) => {
            tracing::warn!("Rejected WebSocket handshake: {}", e);
            return Err(StatusCode::UNAUTHORIZED);
        }
    };

    tracing::debug!("Authenticated '{}' ({})", identity.user_id, identity.email);
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, identity)))
}

/// `Authorization: Bearer <token>` wins over `?token=`.
fn extract_credential(headers: &HeaderMap, query: &ConnectQuery) -> Option<String> {
    let from_header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    from_header
        .map(str::to_string)
        .or_else(|| query.token.clone().filter(|token| !token.is_empty()))
}

/// Spawns a task that receives messages from the rx channel and pushes them to the WebSocket sender.
///
/// This function handles the outbound message flow: events relayed from other connections
/// (via rx channel) are sent to this client's WebSocket connection. On shutdown a close frame
/// is sent and the task ends.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
    mut shutdown: watch::Receiver<bool>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                msg = rx.recv() => {
                    let Some(msg) = msg else { break };
                    if sender.send(Message::Text(msg.into())).await.is_err() {
                        break;
                    }
                }
                _ = shutdown.changed() => {
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, identity: Identity) {
    let (sender, mut receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel();

    // Active になり、個人チャンネルに参加
    let connection = match state.connect_user_usecase.execute(identity, tx).await {
        Ok(connection) => connection,
        Err(e) => {
            tracing::error!("Failed to register connection: {}", e);
            return;
        }
    };
    let connection_id = connection.id.clone();

    let state_clone = state.clone();
    let connection_id_clone = connection_id.clone();

    // Spawn a task to receive events from this client
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on '{}': {}", connection_id_clone, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    if let Err(e) = handle_frame(&state_clone, &connection_id_clone, &text).await
                    {
                        if e.is_fatal() {
                            tracing::warn!("Stop reading from '{}': {}", connection_id_clone, e);
                            break;
                        }
                        tracing::warn!("Dropped event from '{}': {}", connection_id_clone, e);
                    }
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", connection_id_clone);
                    break;
                }
                // Ping/pong is handled automatically by the WebSocket protocol
                _ => {}
            }
        }
    });

    // Spawn a task to push relayed events to this client
    let mut send_task = pusher_loop(rx, sender, state.subscribe_shutdown());

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    match state
        .disconnect_user_usecase
        .execute(&connection_id)
        .await
    {
        Ok(notified) => {
            tracing::debug!(
                "Cleaned up '{}', offline sent to {} connection(s)",
                connection_id,
                notified.len()
            );
        }
        Err(e) => {
            tracing::warn!("Failed to clean up '{}': {}", connection_id, e);
        }
    }
}

async fn handle_frame(
    state: &AppState,
    connection_id: &ConnectionId,
    text: &str,
) -> Result<(), RelayError> {
    let command = parse_frame(text)?;
    let outcome = state.event_relay.dispatch(connection_id, command).await?;
    tracing::debug!("'{}': {:?}", connection_id, outcome);
    Ok(())
}

/// JSON テキストフレーム → ClientEvent (DTO) → ClientCommand (Domain)
fn parse_frame(text: &str) -> Result<ClientCommand, RelayError> {
    let event = serde_json::from_str::<ClientEvent>(text)
        .map_err(|e| RelayError::InvalidPayload(e.to_string()))?;
    Ok(ClientCommand::try_from(event)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChatId, PresenceStatus};
    use axum::http::HeaderValue;

    fn query(token: Option<&str>) -> ConnectQuery {
        ConnectQuery {
            token: token.map(str::to_string),
        }
    }

    #[test]
    fn test_credential_from_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));

        assert_eq!(
            extract_credential(&headers, &query(Some("from-query"))),
            Some("abc.def.ghi".to_string())
        );
    }

    #[test]
    fn test_credential_from_query() {
        assert_eq!(
            extract_credential(&HeaderMap::new(), &query(Some("from-query"))),
            Some("from-query".to_string())
        );
    }

    #[test]
    fn test_credential_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));

        assert_eq!(extract_credential(&headers, &query(None)), None);
        assert_eq!(extract_credential(&HeaderMap::new(), &query(Some(""))), None);
    }

    #[test]
    fn test_parse_join_chat_frame() {
        let command = parse_frame(r#"{"event":"join_chat","data":"C1"}"#).unwrap();

        assert_eq!(
            command,
            ClientCommand::JoinChat(ChatId::try_from("C1").unwrap())
        );
    }

    #[test]
    fn test_parse_update_presence_frame() {
        let command = parse_frame(r#"{"event":"update_presence","data":"busy"}"#).unwrap();

        assert_eq!(command, ClientCommand::UpdatePresence(PresenceStatus::Busy));
    }

    #[test]
    fn test_parse_invalid_frames() {
        let frames = [
            "not json",
            r#"{"event":"fly_to_moon","data":"C1"}"#,
            r#"{"event":"send_message","data":{"chatId":"C1"}}"#,
            r#"{"event":"send_message","data":{"chatId":"","message":"hi"}}"#,
            r#"{"event":"update_presence","data":"sleeping"}"#,
        ];

        for frame in frames {
            let result = parse_frame(frame);
            assert!(
                matches!(result, Err(RelayError::InvalidPayload(_))),
                "frame {} should be rejected, got {:?}",
                frame,
                result
            );
        }
    }
}
