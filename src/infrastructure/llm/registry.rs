//! Provider registry
//!
//! Read-only table from provider id to adapter, built once at startup.

use std::collections::HashMap;

use tracing::info;

use super::adapter::ProviderAdapter;
use super::anthropic::AnthropicAdapter;
use super::config::LlmSettings;
use super::gemini::GeminiAdapter;
use super::http_client::HttpClient;
use super::openai::OpenAiAdapter;
use crate::domain::{DomainError, ProviderId};

#[derive(Debug, Default)]
pub struct ProviderRegistry {
    adapters: HashMap<ProviderId, ProviderAdapter>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the built-in vendor adapters against one shared HTTP client
    pub fn from_settings(settings: &LlmSettings) -> Result<Self, DomainError> {
        let client = HttpClient::new(settings)?;
        let buffer = settings.stream_buffer_size;

        let mut registry = Self::new();
        registry.register(ProviderAdapter::OpenAi(OpenAiAdapter::new(
            client.clone(),
            &settings.openai_base_url,
            buffer,
        )));
        registry.register(ProviderAdapter::Anthropic(AnthropicAdapter::new(
            client.clone(),
            &settings.anthropic_base_url,
            buffer,
        )));
        registry.register(ProviderAdapter::Google(GeminiAdapter::new(
            client,
            &settings.google_base_url,
            buffer,
        )));

        Ok(registry)
    }

    /// Add an adapter, replacing any previous one for the same provider
    pub fn register(&mut self, adapter: ProviderAdapter) {
        let provider = adapter.provider_id();
        info!(provider = %provider, "Registering LLM provider adapter");
        self.adapters.insert(provider, adapter);
    }

    pub fn get(&self, provider: ProviderId) -> Result<&ProviderAdapter, DomainError> {
        self.adapters
            .get(&provider)
            .ok_or_else(|| DomainError::unknown_provider(provider.as_str()))
    }

    pub fn get_by_name(&self, name: &str) -> Result<&ProviderAdapter, DomainError> {
        let provider: ProviderId = name.parse()?;
        self.get(provider)
    }

    /// Providers that have an adapter, in catalog order
    pub fn registered(&self) -> Vec<ProviderId> {
        ProviderId::ALL
            .into_iter()
            .filter(|id| self.adapters.contains_key(id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ProviderRegistry {
        ProviderRegistry::from_settings(&LlmSettings::default()).unwrap()
    }

    #[test]
    fn test_registers_builtin_vendors() {
        let registry = registry();

        assert_eq!(
            registry.registered(),
            vec![ProviderId::OpenAi, ProviderId::Anthropic, ProviderId::Google]
        );
        assert_eq!(
            registry.get(ProviderId::Google).unwrap().provider_id(),
            ProviderId::Google
        );
    }

    #[test]
    fn test_get_by_name() {
        let registry = registry();
        let adapter = registry.get_by_name("anthropic").unwrap();

        assert!(matches!(adapter, ProviderAdapter::Anthropic(_)));
    }

    #[test]
    fn test_unknown_name_fails() {
        let err = registry().get_by_name("made-up-id").unwrap_err();

        assert!(matches!(err, DomainError::UnknownProvider { ref provider } if provider == "made-up-id"));
    }

    #[test]
    fn test_custom_has_no_adapter() {
        let registry = registry();

        assert!(matches!(
            registry.get(ProviderId::Custom),
            Err(DomainError::UnknownProvider { .. })
        ));
        assert!(matches!(
            registry.get_by_name("custom"),
            Err(DomainError::UnknownProvider { .. })
        ));
    }

    #[test]
    fn test_empty_registry() {
        let registry = ProviderRegistry::new();

        assert!(registry.registered().is_empty());
        assert!(registry.get(ProviderId::OpenAi).is_err());
    }
}
