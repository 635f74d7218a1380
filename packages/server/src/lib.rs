//! Real-time chat and notification relay.
//!
//! Authenticated WebSocket connections join personal and topic channels and exchange chat
//! messages, typing indicators, notifications, session updates and presence updates.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
