//! Conversation entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::chatbot::ChatbotId;
use crate::domain::llm::{Message, MessageRole};

/// Conversation identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A widget conversation between one visitor and one chatbot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub chatbot_id: ChatbotId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visitor_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(chatbot_id: ChatbotId, visitor_id: Option<String>) -> Self {
        Self {
            id: ConversationId::generate(),
            chatbot_id,
            visitor_id,
            created_at: Utc::now(),
        }
    }
}

/// A persisted message row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: String,
    pub conversation_id: ConversationId,
    pub role: MessageRole,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    pub created_at: DateTime<Utc>,
}

impl StoredMessage {
    pub fn new(conversation_id: ConversationId, role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            conversation_id,
            role,
            content: content.into(),
            tokens_used: None,
            latency_ms: None,
            created_at: Utc::now(),
        }
    }

    pub fn user(conversation_id: ConversationId, content: impl Into<String>) -> Self {
        Self::new(conversation_id, MessageRole::User, content)
    }

    pub fn assistant(conversation_id: ConversationId, content: impl Into<String>) -> Self {
        Self::new(conversation_id, MessageRole::Assistant, content)
    }

    pub fn with_tokens_used(mut self, tokens: u32) -> Self {
        self.tokens_used = Some(tokens);
        self
    }

    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        self.latency_ms = Some(latency_ms);
        self
    }

    /// Convert to the canonical message used for model history
    pub fn to_message(&self) -> Message {
        Message::new(self.role, self.content.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_ids_are_unique() {
        let a = Conversation::new(ChatbotId::new("bot1"), None);
        let b = Conversation::new(ChatbotId::new("bot1"), Some("visitor".to_string()));
        assert_ne!(a.id, b.id);
        assert_eq!(b.visitor_id.as_deref(), Some("visitor"));
    }

    #[test]
    fn test_stored_message_to_message() {
        let stored = StoredMessage::assistant(ConversationId::new("c1"), "hi there")
            .with_tokens_used(12)
            .with_latency_ms(340);

        assert_eq!(stored.to_message(), Message::assistant("hi there"));
        assert_eq!(stored.tokens_used, Some(12));
        assert_eq!(stored.latency_ms, Some(340));
    }
}
