//! In-memory conversation repository

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::conversation::{
    Conversation, ConversationId, ConversationRepository, StoredMessage,
};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct Thread {
    conversation: Option<Conversation>,
    messages: Vec<StoredMessage>,
}

/// Conversations and their messages held in process memory
#[derive(Debug, Default)]
pub struct InMemoryConversationRepository {
    threads: RwLock<HashMap<ConversationId, Thread>>,
}

impl InMemoryConversationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every message of a conversation in insertion order
    pub fn messages(&self, id: &ConversationId) -> Result<Vec<StoredMessage>, DomainError> {
        let threads = self
            .threads
            .read()
            .map_err(|e| DomainError::storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(threads
            .get(id)
            .map(|t| t.messages.clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn get(&self, id: &ConversationId) -> Result<Option<Conversation>, DomainError> {
        let threads = self
            .threads
            .read()
            .map_err(|e| DomainError::storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(threads.get(id).and_then(|t| t.conversation.clone()))
    }

    async fn create(&self, conversation: Conversation) -> Result<Conversation, DomainError> {
        let mut threads = self
            .threads
            .write()
            .map_err(|e| DomainError::storage(format!("Failed to acquire write lock: {}", e)))?;

        let thread = threads.entry(conversation.id.clone()).or_default();

        if thread.conversation.is_some() {
            return Err(DomainError::conflict(format!(
                "Conversation '{}' already exists",
                conversation.id
            )));
        }

        thread.conversation = Some(conversation.clone());
        Ok(conversation)
    }

    async fn append_message(&self, message: StoredMessage) -> Result<StoredMessage, DomainError> {
        let mut threads = self
            .threads
            .write()
            .map_err(|e| DomainError::storage(format!("Failed to acquire write lock: {}", e)))?;

        let thread = threads
            .get_mut(&message.conversation_id)
            .filter(|t| t.conversation.is_some())
            .ok_or_else(|| {
                DomainError::not_found(format!(
                    "Conversation '{}' not found",
                    message.conversation_id
                ))
            })?;

        thread.messages.push(message.clone());
        Ok(message)
    }

    async fn recent_messages(
        &self,
        id: &ConversationId,
        limit: usize,
    ) -> Result<Vec<StoredMessage>, DomainError> {
        let threads = self
            .threads
            .read()
            .map_err(|e| DomainError::storage(format!("Failed to acquire read lock: {}", e)))?;

        let Some(thread) = threads.get(id) else {
            return Ok(Vec::new());
        };

        let skip = thread.messages.len().saturating_sub(limit);
        Ok(thread.messages[skip..].to_vec())
    }
}
