//! Raw-text context retriever
//!
//! No chunking or ranking: a chatbot's documents are returned in the order
//! they were added, capped at `max_snippets`.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::knowledge::{ContextRetriever, KnowledgeDocument};
use crate::domain::{ChatbotId, DomainError};

pub const DEFAULT_MAX_SNIPPETS: usize = 5;

#[derive(Debug)]
pub struct InMemoryContextRetriever {
    documents: RwLock<HashMap<ChatbotId, Vec<KnowledgeDocument>>>,
    max_snippets: usize,
}

impl Default for InMemoryContextRetriever {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SNIPPETS)
    }
}

impl InMemoryContextRetriever {
    pub fn new(max_snippets: usize) -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            max_snippets,
        }
    }

    pub fn add_document(&self, document: KnowledgeDocument) -> Result<(), DomainError> {
        let mut documents = self
            .documents
            .write()
            .map_err(|e| DomainError::storage(format!("Failed to acquire write lock: {}", e)))?;

        documents
            .entry(document.chatbot_id.clone())
            .or_default()
            .push(document);

        Ok(())
    }
}

#[async_trait]
impl ContextRetriever for InMemoryContextRetriever {
    async fn retrieve(
        &self,
        chatbot_id: &ChatbotId,
        _query: &str,
    ) -> Result<Vec<String>, DomainError> {
        let documents = self
            .documents
            .read()
            .map_err(|e| DomainError::storage(format!("Failed to acquire read lock: {}", e)))?;

        let snippets: Vec<String> = documents
            .get(chatbot_id)
            .into_iter()
            .flatten()
            .filter(|d| !d.content.trim().is_empty())
            .take(self.max_snippets)
            .map(|d| d.content.clone())
            .collect();

        debug!(chatbot_id = %chatbot_id, snippets = snippets.len(), "Retrieved context");

        Ok(snippets)
    }
}
