//! Application state for shared services

use std::sync::Arc;

use crate::domain::{Chatbot, ContextRetriever, ConversationRepository, Storage};
use crate::infrastructure::crypto::SecretCipher;
use crate::infrastructure::llm::LlmGateway;

/// Stored messages loaded as history for each turn
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Shared handles for request handlers; cloning is cheap
#[derive(Clone)]
pub struct AppState {
    pub gateway: LlmGateway,
    pub chatbots: Arc<dyn Storage<Chatbot>>,
    pub conversations: Arc<dyn ConversationRepository>,
    pub retriever: Arc<dyn ContextRetriever>,
    pub cipher: SecretCipher,
    pub history_limit: usize,
}

impl AppState {
    pub fn new(
        gateway: LlmGateway,
        chatbots: Arc<dyn Storage<Chatbot>>,
        conversations: Arc<dyn ConversationRepository>,
        retriever: Arc<dyn ContextRetriever>,
        cipher: SecretCipher,
    ) -> Self {
        Self {
            gateway,
            chatbots,
            conversations,
            retriever,
            cipher,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}
