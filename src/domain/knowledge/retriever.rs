use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::chatbot::ChatbotId;
use crate::domain::DomainError;

/// Raw text document attached to a chatbot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeDocument {
    pub id: String,
    pub chatbot_id: ChatbotId,
    pub content: String,
}

/// Source of context snippets for a chatbot turn
#[async_trait]
pub trait ContextRetriever: Send + Sync + Debug {
    /// Ordered snippets for `query`; may be empty
    async fn retrieve(&self, chatbot_id: &ChatbotId, query: &str)
        -> Result<Vec<String>, DomainError>;
}
