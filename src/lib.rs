//! Chatbot LLM Gateway
//!
//! A chat endpoint for embeddable chatbots backed by one unified interface
//! over several LLM vendors:
//! - Blocking and streaming completions with identical results
//! - Per-chatbot provider, model and encrypted API key
//! - Conversation history and raw-text context injection

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use config::ChatbotSeed;
use infrastructure::{
    conversation::InMemoryConversationRepository,
    crypto::SecretCipher,
    knowledge::InMemoryContextRetriever,
    llm::{LlmGateway, ProviderRegistry},
    storage::InMemoryStorage,
};
use tracing::info;

/// Create the application state, seeding chatbots and their documents from configuration
pub fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let cipher = build_cipher(config)?;

    let registry = ProviderRegistry::from_settings(&config.gateway)?;
    let providers = registry.registered();
    let gateway = LlmGateway::new(Arc::new(registry));

    let chatbots = InMemoryStorage::with_entities(config.chatbots.iter().map(ChatbotSeed::to_chatbot));

    let retriever = InMemoryContextRetriever::new(config.retrieval.max_snippets);
    let mut documents = 0;

    for seed in &config.chatbots {
        for document in seed.knowledge_documents() {
            retriever.add_document(document)?;
            documents += 1;
        }
    }

    info!(
        chatbots = config.chatbots.len(),
        documents,
        providers = ?providers,
        "Application state initialized"
    );

    Ok(AppState::new(
        gateway,
        Arc::new(chatbots),
        Arc::new(InMemoryConversationRepository::new()),
        Arc::new(retriever),
        cipher,
    ))
}

fn build_cipher(config: &AppConfig) -> anyhow::Result<SecretCipher> {
    match config.secrets.encryption_key.as_deref() {
        Some(secret) => Ok(SecretCipher::from_secret(secret)?),
        None if config
            .chatbots
            .iter()
            .any(|seed| seed.encrypted_api_key.is_some()) =>
        {
            anyhow::bail!("secrets.encryption_key is required when chatbots carry encrypted API keys")
        }
        None => Ok(SecretCipher::ephemeral()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChatbotId, ProviderId};

    fn seed(encrypted_api_key: Option<String>) -> ChatbotSeed {
        serde_json::from_value(serde_json::json!({
            "id": "bot1",
            "name": "Support",
            "provider": "openai",
            "model": "gpt-4o",
            "encrypted_api_key": encrypted_api_key,
            "documents": ["Opening hours are 9 to 5."]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_state_seeds_chatbots_and_documents() {
        let mut config = AppConfig::default();
        config.chatbots.push(seed(None));

        let state = create_app_state_with_config(&config).unwrap();

        let bot = state
            .chatbots
            .get(&ChatbotId::new("bot1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(bot.provider(), ProviderId::OpenAi);

        let snippets = state
            .retriever
            .retrieve(&ChatbotId::new("bot1"), "when are you open?")
            .await
            .unwrap();
        assert_eq!(snippets, vec!["Opening hours are 9 to 5.".to_string()]);
    }

    #[test]
    fn test_encrypted_seed_requires_encryption_key() {
        let mut config = AppConfig::default();
        config.chatbots.push(seed(Some("b64".to_string())));

        assert!(create_app_state_with_config(&config).is_err());

        config.secrets.encryption_key = Some("server-secret".to_string());
        assert!(create_app_state_with_config(&config).is_ok());
    }
}
