//! LLM provider domain models

mod catalog;
mod message;
mod provider;
mod response;

pub use catalog::{available_models, available_providers, ProviderInfo};
pub use message::{Message, MessageRole};
pub use provider::{LlmStream, ProviderConfig, ProviderId, SecretString};
pub use response::{LlmResponse, StreamChunk};
