//! Data Transfer Objects (DTOs) for the relay.
//!
//! - `websocket`: WebSocket frame DTOs (`{"event": ..., "data": ...}`)
//! - `conversion`: DTO <-> domain conversion

pub mod conversion;
pub mod websocket;
