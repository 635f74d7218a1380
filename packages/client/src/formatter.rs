//! Event formatting utilities for client display.

use skillsync_server::infrastructure::dto::websocket::ServerEvent;

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format an event pushed by the relay
    pub fn format_event(event: &ServerEvent) -> String {
        match event {
            ServerEvent::NewMessage(message) => {
                let direct = match &message.receiver_id {
                    Some(receiver_id) => format!(" (direct to {})", receiver_id),
                    None => String::new(),
                };
                format!(
                    "\n\n------------------------------------------------------------\n\
                     [{}] @{}{}: {}\n\
                     sent at {}\n\
                     ------------------------------------------------------------\n",
                    message.chat_id,
                    message.sender_email,
                    direct,
                    message.message,
                    message.timestamp
                )
            }
            ServerEvent::UserTyping(typing) => {
                format!("\n[{}] {} is typing...\n", typing.chat_id, typing.user_email)
            }
            ServerEvent::UserStoppedTyping(typing) => {
                format!("\n[{}] {} stopped typing\n", typing.chat_id, typing.user_id)
            }
            ServerEvent::NewNotification(notification) => format!(
                "\n(!) [{}] {}: {}\n    from {} at {}\n",
                notification.kind,
                notification.title,
                notification.message,
                notification.sender_id,
                notification.timestamp
            ),
            ServerEvent::SessionStatusUpdate(update) => format!(
                "\n# session {} is now {} ({})\n",
                update.session_id, update.status, update.timestamp
            ),
            ServerEvent::UserPresenceUpdate(presence) => format!(
                "\n* {} is {} (last seen {})\n",
                presence.user_id, presence.status, presence.last_seen
            ),
        }
    }

    /// Format a frame that is not a known event
    pub fn format_raw_message(text: &str) -> String {
        format!("\n{}\n", text)
    }

    /// Format a binary message notification
    pub fn format_binary_message(byte_count: usize) -> String {
        format!("\nReceived binary message ({} bytes)\n", byte_count)
    }

    pub fn format_help() -> String {
        [
            "",
            "Commands:",
            "  /join <chat>                              join a chat",
            "  /leave <chat>                             leave a chat",
            "  /msg <chat> <text>                        send a message",
            "  /dm <chat> <user> <text>                  send a message to a user",
            "  /typing <chat>, /stop <chat>              typing indicator",
            "  /presence <online|away|busy>              update your presence",
            "  /notify <user> <kind> <title> | <text>    send a notification",
            "  /session <id> <status> <user,user,...>    update a session",
            "  /quit                                     exit",
            "Any other line is sent to the chat joined last.",
            "",
        ]
        .join("\n")
    }
}
