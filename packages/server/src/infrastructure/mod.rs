//! Infrastructure layer: concrete implementations of the domain ports and wire DTOs.

pub mod auth;
pub mod dto;
pub mod message_pusher;
pub mod registry;
