//! Telegram adapter (teloxide).
//!
//! Routes updates to the command / edited-message / callback handlers and
//! owns the polling vs webhook lifecycle.

pub mod handlers;
pub mod router;

use teloxide::types::Message;

use godbot_core::domain::{ChatId, MessageId, MessageKey};

/// Store key of a Telegram message.
pub(crate) fn message_key(msg: &Message) -> MessageKey {
    MessageKey::new(ChatId(msg.chat.id.0), MessageId(msg.id.0))
}
