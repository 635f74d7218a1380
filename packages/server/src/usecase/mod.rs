//! UseCase layer: connection lifecycle and event relay.

mod chat_membership;
mod connect_user;
mod disconnect_user;
mod error;
mod event_relay;
mod send_message;
mod send_notification;
mod session_update;
mod typing_indicator;
mod update_presence;

#[cfg(test)]
mod test_support;

pub use chat_membership::ChatMembershipUseCase;
pub use connect_user::ConnectUserUseCase;
pub use disconnect_user::DisconnectUserUseCase;
pub use error::{ConnectError, DisconnectError, RelayError};
pub use event_relay::{EventRelay, RelayOutcome};
pub use send_message::SendMessageUseCase;
pub use send_notification::SendNotificationUseCase;
pub use session_update::SessionUpdateUseCase;
pub use typing_indicator::TypingIndicatorUseCase;
pub use update_presence::UpdatePresenceUseCase;

use crate::domain::ConnectionId;

/// 送信元の接続を除いたブロードキャスト対象
fn exclude_sender(targets: Vec<ConnectionId>, sender: &ConnectionId) -> Vec<ConnectionId> {
    targets.into_iter().filter(|id| id != sender).collect()
}
