//! Domain layer - Core gateway types and collaborator contracts

pub mod chat;
pub mod chatbot;
pub mod conversation;
pub mod error;
pub mod knowledge;
pub mod llm;
pub mod storage;

pub use chat::build_messages;
pub use chatbot::{Chatbot, ChatbotId};
pub use conversation::{Conversation, ConversationId, ConversationRepository, StoredMessage};
pub use error::DomainError;
pub use knowledge::{ContextRetriever, KnowledgeDocument};
pub use llm::{
    available_models, available_providers, LlmResponse, ProviderInfo, LlmStream, Message, MessageRole, ProviderConfig, ProviderId, SecretString,
    StreamChunk,
};
pub use storage::{Storage, StorageEntity, StorageKey};
