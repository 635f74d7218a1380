//! Identifier factories.
//!
//! Message and notification ids combine a millisecond time component with a random base36
//! suffix. They are unique per process lifetime; nothing is ever looked up by them.

use rand::Rng;
use uuid::Uuid;

use super::value_object::{ConnectionId, MessageId, NotificationId, Timestamp};

/// Length of the random suffix of message and notification ids
const RANDOM_SUFFIX_LENGTH: usize = 9;

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Random base36 string of `RANDOM_SUFFIX_LENGTH` characters
fn random_suffix() -> String {
    let mut rng = rand::thread_rng();
    (0..RANDOM_SUFFIX_LENGTH)
        .map(|_| BASE36_DIGITS[rng.gen_range(0..BASE36_DIGITS.len())] as char)
        .collect()
}

/// Generates transport-level connection ids
pub struct ConnectionIdFactory;

impl ConnectionIdFactory {
    pub fn generate() -> ConnectionId {
        ConnectionId::from_generated(Uuid::new_v4().to_string())
    }
}

/// Generates `msg_<millis>_<suffix>` ids
pub struct MessageIdFactory;

impl MessageIdFactory {
    pub fn generate(now: Timestamp) -> MessageId {
        MessageId::from_generated(format!("msg_{}_{}", now.value(), random_suffix()))
    }
}

/// Generates `notif_<millis>_<suffix>` ids
pub struct NotificationIdFactory;

impl NotificationIdFactory {
    pub fn generate(now: Timestamp) -> NotificationId {
        NotificationId::from_generated(format!("notif_{}_{}", now.value(), random_suffix()))
    }
}
