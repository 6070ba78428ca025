use serde::Deserialize;

use crate::domain::{Chatbot, ChatbotId, KnowledgeDocument, ProviderId};
use crate::infrastructure::knowledge::DEFAULT_MAX_SNIPPETS;
use crate::infrastructure::llm::LlmSettings;
use crate::infrastructure::logging::LoggingConfig;
use crate::infrastructure::observability::ObservabilityConfig;

/// Application configuration
///
/// Sources, later ones winning: `config/default.*`, `config/local.*`,
/// then `APP__`-prefixed environment variables (`APP__SERVER__PORT=9000`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
    #[serde(default)]
    pub gateway: LlmSettings,
    #[serde(default)]
    pub secrets: SecretsConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// Chatbots loaded into the store at startup
    #[serde(default)]
    pub chatbots: Vec<ChatbotSeed>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Clone, Default, Deserialize)]
pub struct SecretsConfig {
    /// Server secret for provider API keys at rest
    #[serde(default)]
    pub encryption_key: Option<String>,
}

impl std::fmt::Debug for SecretsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretsConfig")
            .field(
                "encryption_key",
                &self.encryption_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_max_snippets")]
    pub max_snippets: usize,
}

/// A chatbot definition from configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ChatbotSeed {
    pub id: String,
    pub name: String,
    #[serde(default = "default_true")]
    pub active: bool,
    pub provider: ProviderId,
    pub model: String,
    /// Output of the `encrypt-key` command
    #[serde(default)]
    pub encrypted_api_key: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub allowed_domains: Vec<String>,
    /// Raw knowledge texts handed to the context retriever
    #[serde(default)]
    pub documents: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_snippets() -> usize {
    DEFAULT_MAX_SNIPPETS
}

fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_snippets: default_max_snippets(),
        }
    }
}

impl ChatbotSeed {
    pub fn to_chatbot(&self) -> Chatbot {
        let mut chatbot = Chatbot::new(
            ChatbotId::new(&self.id),
            &self.name,
            self.provider,
            &self.model,
        )
        .with_active(self.active)
        .with_allowed_domains(self.allowed_domains.clone());

        if let Some(key) = &self.encrypted_api_key {
            chatbot = chatbot.with_encrypted_api_key(key);
        }
        if let Some(temperature) = self.temperature {
            chatbot = chatbot.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            chatbot = chatbot.with_max_tokens(max_tokens);
        }
        if let Some(prompt) = &self.system_prompt {
            chatbot = chatbot.with_system_prompt(prompt);
        }

        chatbot
    }

    pub fn knowledge_documents(&self) -> impl Iterator<Item = KnowledgeDocument> + '_ {
        self.documents
            .iter()
            .enumerate()
            .map(|(i, content)| KnowledgeDocument {
                id: format!("{}-doc-{}", self.id, i + 1),
                chatbot_id: ChatbotId::new(&self.id),
                content: content.clone(),
            })
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
