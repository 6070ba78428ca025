//! Conversations and their stored messages

mod entity;
mod repository;

pub use entity::{Conversation, ConversationId, StoredMessage};
pub use repository::ConversationRepository;
