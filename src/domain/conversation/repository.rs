//! Conversation repository trait

use std::fmt::Debug;

use async_trait::async_trait;

use super::entity::{Conversation, ConversationId, StoredMessage};
use crate::domain::DomainError;

/// Row store for conversations and their messages
#[async_trait]
pub trait ConversationRepository: Send + Sync + Debug {
    /// Fetch a conversation by id
    async fn get(&self, id: &ConversationId) -> Result<Option<Conversation>, DomainError>;

    /// Persist a new conversation
    async fn create(&self, conversation: Conversation) -> Result<Conversation, DomainError>;

    /// Append a message to an existing conversation
    async fn append_message(&self, message: StoredMessage) -> Result<StoredMessage, DomainError>;

    /// The newest `limit` messages of a conversation, oldest first
    async fn recent_messages(
        &self,
        id: &ConversationId,
        limit: usize,
    ) -> Result<Vec<StoredMessage>, DomainError>;
}
