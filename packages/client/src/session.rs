//! WebSocket client session management.

use futures_util::{SinkExt, StreamExt};
use skillsync_server::infrastructure::dto::websocket::ServerEvent;
use tokio::sync::mpsc;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{
        Error as WsError,
        client::IntoClientRequest,
        http::{HeaderValue, StatusCode, header::AUTHORIZATION},
        protocol::Message,
    },
};

use crate::error::ClientError;

use super::{
    command::{Input, joined_chat, parse_input},
    formatter::MessageFormatter,
    ui::redisplay_prompt,
};

/// Run one WebSocket client session
///
/// Returns `Ok(())` when the user exits, and an error when the handshake is rejected or
/// the connection is lost.
pub async fn run_client_session(
    url: &str,
    token: &str,
    input_rx: &mut mpsc::UnboundedReceiver<String>,
) -> Result<(), ClientError> {
    let mut request = url
        .into_client_request()
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;
    let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|e| ClientError::Unauthorized(e.to_string()))?;
    request.headers_mut().insert(AUTHORIZATION, bearer);

    let (ws_stream, _) = match connect_async(request).await {
        Ok(result) => result,
        Err(WsError::Http(response)) if response.status() == StatusCode::UNAUTHORIZED => {
            return Err(ClientError::Unauthorized(
                "the relay rejected the token".to_string(),
            ));
        }
        Err(e) => return Err(ClientError::ConnectionError(e.to_string())),
    };

    tracing::info!("Connected to SkillSync relay!");
    println!("\nType /help for commands. Press Ctrl+C to exit.\n");

    let (mut write, mut read) = ws_stream.split();

    // Spawn a task to handle incoming events; it ends when the connection does
    let mut read_task = tokio::spawn(async move {
        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    let formatted = match serde_json::from_str::<ServerEvent>(text.as_str()) {
                        Ok(event) => MessageFormatter::format_event(&event),
                        // If parsing fails, display as raw text
                        Err(_) => MessageFormatter::format_raw_message(text.as_str()),
                    };
                    print!("{}", formatted);
                    redisplay_prompt();
                }
                Ok(Message::Binary(data)) => {
                    print!("{}", MessageFormatter::format_binary_message(data.len()));
                    redisplay_prompt();
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    break;
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    });

    // Plain lines go to the chat joined last
    let mut current_chat: Option<String> = None;

    loop {
        tokio::select! {
            _ = &mut read_task => {
                return Err(ClientError::ConnectionError("Connection lost".to_string()));
            }
            line = input_rx.recv() => {
                let input = match line {
                    Some(line) => parse_input(&line, current_chat.as_deref()),
                    // Ctrl+C / Ctrl+D
                    None => Ok(Input::Quit),
                };

                let event = match input {
                    Ok(Input::Send(event)) => event,
                    Ok(Input::Help) => {
                        println!("{}", MessageFormatter::format_help());
                        redisplay_prompt();
                        continue;
                    }
                    Ok(Input::Quit) => {
                        read_task.abort();
                        let _ = write.close().await;
                        return Ok(());
                    }
                    Err(e) => {
                        println!("{}", e);
                        redisplay_prompt();
                        continue;
                    }
                };

                let json = match serde_json::to_string(&event) {
                    Ok(json) => json,
                    Err(e) => {
                        tracing::error!("Failed to serialize event: {}", e);
                        continue;
                    }
                };

                if let Err(e) = write.send(Message::Text(json.into())).await {
                    tracing::warn!("Failed to send event: {}", e);
                    read_task.abort();
                    return Err(ClientError::ConnectionError("Connection lost".to_string()));
                }

                if let Some(chat_id) = joined_chat(&event) {
                    current_chat = Some(chat_id.to_string());
                }
                redisplay_prompt();
            }
        }
    }
}
