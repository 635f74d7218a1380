//! Domain layer: value objects, entities, events and the ports implemented by infrastructure.

pub mod entity;
pub mod error;
pub mod event;
pub mod factory;
pub mod message_pusher;
pub mod room_registry;
pub mod token_verifier;
pub mod value_object;

pub use entity::{
    ChatMessage, Connection, ConnectionState, Identity, Notification, PresenceUpdate,
    SessionStatusUpdate,
};
pub use error::{AuthError, MessagePushError, RegistryError, ValueObjectError};
pub use event::{ClientCommand, OutboundEvent};
pub use factory::{ConnectionIdFactory, MessageIdFactory, NotificationIdFactory};
pub use message_pusher::{MessagePusher, PusherChannel};
pub use room_registry::RoomRegistry;
pub use token_verifier::TokenVerifier;
pub use value_object::{
    ChannelName, ChatId, ConnectionId, Email, MessageId, MessageText, NotificationId,
    NotificationKind, NotificationTitle, PresenceStatus, SessionId, SessionStatus, Timestamp,
    UserId,
};
