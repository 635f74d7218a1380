//! Prompt line parsing.
//!
//! Lines starting with `/` are commands; any other line is sent as a message to the chat
//! joined last.

use skillsync_server::{
    domain::{NotificationKind, PresenceStatus, SessionStatus},
    infrastructure::dto::websocket::{
        ClientEvent, SendMessagePayload, SendNotificationPayload, SessionUpdatePayload,
        TypingPayload,
    },
};

use crate::error::CommandError;

/// What the prompt asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Send(ClientEvent),
    Help,
    Quit,
}

/// Parse one prompt line
///
/// # Arguments
///
/// * `line` - The trimmed input line
/// * `current_chat` - The chat joined last (target of plain text lines)
pub fn parse_input(line: &str, current_chat: Option<&str>) -> Result<Input, CommandError> {
    let Some(command_line) = line.strip_prefix('/') else {
        let chat_id = current_chat.ok_or(CommandError::NoCurrentChat)?;
        return Ok(Input::Send(send_message(chat_id, line, None)));
    };

    let (command, rest) = split_first(command_line);
    let event = match command {
        "help" => return Ok(Input::Help),
        "quit" | "exit" => return Ok(Input::Quit),
        "join" => ClientEvent::JoinChat(single_arg(rest, "/join <chat>")?),
        "leave" => ClientEvent::LeaveChat(single_arg(rest, "/leave <chat>")?),
        "msg" => {
            const USAGE: &str = "/msg <chat> <text>";
            let (chat_id, text) = split_first(rest);
            send_message(&required(chat_id, USAGE)?, &required(text, USAGE)?, None)
        }
        "dm" => {
            const USAGE: &str = "/dm <chat> <user> <text>";
            let (chat_id, rest) = split_first(rest);
            let (receiver_id, text) = split_first(rest);
            send_message(
                &required(chat_id, USAGE)?,
                &required(text, USAGE)?,
                Some(required(receiver_id, USAGE)?),
            )
        }
        "typing" => ClientEvent::TypingStart(TypingPayload {
            chat_id: single_arg(rest, "/typing <chat>")?,
        }),
        "stop" => ClientEvent::TypingStop(TypingPayload {
            chat_id: single_arg(rest, "/stop <chat>")?,
        }),
        "presence" => {
            let status = single_arg(rest, "/presence <online|away|busy>")?;
            PresenceStatus::parse_reported(&status)
                .map_err(|e| CommandError::InvalidArgument(e.to_string()))?;
            ClientEvent::UpdatePresence(status)
        }
        "notify" => parse_notify(rest)?,
        "session" => parse_session(rest)?,
        other => return Err(CommandError::UnknownCommand(format!("/{}", other))),
    };
    Ok(Input::Send(event))
}

/// Chat that becomes the current chat once `event` is sent
pub fn joined_chat(event: &ClientEvent) -> Option<&str> {
    match event {
        ClientEvent::JoinChat(chat_id) => Some(chat_id.as_str()),
        _ => None,
    }
}

/// `/notify <user> <kind> <title> | <text>`
fn parse_notify(rest: &str) -> Result<ClientEvent, CommandError> {
    const USAGE: &str = "/notify <user> <kind> <title> | <text>";
    let (receiver_id, rest) = split_first(rest);
    let (kind, rest) = split_first(rest);
    let (title, text) = rest.split_once('|').ok_or(CommandError::Usage(USAGE))?;

    let kind = required(kind, USAGE)?;
    kind.parse::<NotificationKind>()
        .map_err(|e| CommandError::InvalidArgument(e.to_string()))?;

    Ok(ClientEvent::SendNotification(SendNotificationPayload {
        receiver_id: required(receiver_id, USAGE)?,
        kind,
        title: required(title.trim(), USAGE)?,
        message: required(text.trim(), USAGE)?,
    }))
}

/// `/session <id> <started|ended|paused> <user,user,...>`
fn parse_session(rest: &str) -> Result<ClientEvent, CommandError> {
    const USAGE: &str = "/session <id> <started|ended|paused> <user,user,...>";
    let (session_id, rest) = split_first(rest);
    let (status, participants) = split_first(rest);

    let status = required(status, USAGE)?;
    status
        .parse::<SessionStatus>()
        .map_err(|e| CommandError::InvalidArgument(e.to_string()))?;

    Ok(ClientEvent::SessionUpdate(SessionUpdatePayload {
        session_id: required(session_id, USAGE)?,
        status,
        participants: participants
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect(),
    }))
}

fn send_message(chat_id: &str, text: &str, receiver_id: Option<String>) -> ClientEvent {
    ClientEvent::SendMessage(SendMessagePayload {
        chat_id: chat_id.to_string(),
        message: text.to_string(),
        receiver_id,
    })
}

/// Split off the first whitespace-separated word
fn split_first(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.split_once(char::is_whitespace) {
        Some((first, rest)) => (first, rest.trim_start()),
        None => (s, ""),
    }
}

fn required(value: &str, usage: &'static str) -> Result<String, CommandError> {
    if value.is_empty() {
        Err(CommandError::Usage(usage))
    } else {
        Ok(value.to_string())
    }
}

fn single_arg(rest: &str, usage: &'static str) -> Result<String, CommandError> {
    let (arg, extra) = split_first(rest);
    if !extra.is_empty() {
        return Err(CommandError::Usage(usage));
    }
    required(arg, usage)
}
