//! Utilities shared between the SkillSync relay server and client.

pub mod logger;
pub mod time;
