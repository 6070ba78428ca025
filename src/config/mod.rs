//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, ChatbotSeed, RetrievalConfig, SecretsConfig, ServerConfig,
};
