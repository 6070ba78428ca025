//! Unified LLM gateway
//!
//! The single entry point callers use to talk to any vendor. Resolves the
//! adapter from the registry, forwards the call and records metrics.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info_span, warn, Instrument};

use super::adapter::ProviderAdapter;
use super::registry::ProviderRegistry;
use crate::domain::{
    available_models, available_providers, DomainError, LlmResponse, LlmStream, Message,
    ProviderConfig, ProviderId, ProviderInfo,
};
use crate::infrastructure::observability::{record_llm_request, LlmRequestMetricParams};

#[derive(Debug, Clone)]
pub struct LlmGateway {
    registry: Arc<ProviderRegistry>,
}

impl LlmGateway {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    fn adapter(&self, provider: ProviderId) -> Result<&ProviderAdapter, DomainError> {
        self.registry.get(provider)
    }

    /// Blocking completion
    pub async fn chat(
        &self,
        messages: &[Message],
        config: &ProviderConfig,
    ) -> Result<LlmResponse, DomainError> {
        let adapter = self.adapter(config.provider)?;
        let span = info_span!(
            "llm.chat",
            provider = %config.provider,
            model = %config.model,
            messages = messages.len(),
        );

        let start = Instant::now();
        let result = adapter.chat(messages, config).instrument(span).await;

        record_llm_request(LlmRequestMetricParams {
            provider: config.provider.as_str(),
            model: &config.model,
            duration: start.elapsed(),
            success: result.is_ok(),
            streaming: false,
            tokens: result.as_ref().ok().map(|r| u64::from(r.tokens_used)),
        });

        match &result {
            Ok(response) => debug!(
                provider = %config.provider,
                tokens_used = response.tokens_used,
                "LLM chat completed"
            ),
            Err(e) => warn!(provider = %config.provider, error = %e, "LLM chat failed"),
        }

        result
    }

    /// Streaming completion; the adapter's chunk sequence is returned unchanged
    pub async fn stream(
        &self,
        messages: &[Message],
        config: &ProviderConfig,
    ) -> Result<LlmStream, DomainError> {
        let adapter = self.adapter(config.provider)?;
        let span = info_span!(
            "llm.stream",
            provider = %config.provider,
            model = %config.model,
            messages = messages.len(),
        );

        let start = Instant::now();
        let result = adapter.stream(messages, config).instrument(span).await;

        // Duration covers opening the upstream stream, not draining it
        record_llm_request(LlmRequestMetricParams {
            provider: config.provider.as_str(),
            model: &config.model,
            duration: start.elapsed(),
            success: result.is_ok(),
            streaming: true,
            tokens: None,
        });

        if let Err(e) = &result {
            warn!(provider = %config.provider, error = %e, "LLM stream failed to open");
        }

        result
    }

    /// Probe a key against the vendor; unknown providers fail, probe errors read as false
    pub async fn validate_api_key(
        &self,
        provider: ProviderId,
        api_key: &str,
    ) -> Result<bool, DomainError> {
        let adapter = self.adapter(provider)?;

        if api_key.trim().is_empty() {
            return Ok(false);
        }

        let valid = adapter
            .validate_api_key(api_key)
            .instrument(info_span!("llm.validate_key", provider = %provider))
            .await;

        debug!(provider = %provider, valid, "API key validation finished");

        Ok(valid)
    }

    pub fn available_models(&self, provider: ProviderId) -> &'static [&'static str] {
        available_models(provider)
    }

    pub fn available_providers(&self) -> Vec<ProviderInfo> {
        available_providers()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StreamChunk;
    use crate::infrastructure::llm::config::LlmSettings;
    use futures::StreamExt;
    use wiremock::matchers::{body_partial_json, method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway(settings: LlmSettings) -> LlmGateway {
        LlmGateway::new(Arc::new(ProviderRegistry::from_settings(&settings).unwrap()))
    }

    fn stub_gateway(server: &MockServer) -> LlmGateway {
        gateway(LlmSettings::default().with_base_url(server.uri()))
    }

    async fn stream_text(gateway: &LlmGateway, config: &ProviderConfig) -> String {
        let stream = gateway
            .stream(&[Message::user("Hi")], config)
            .await
            .unwrap();
        let chunks: Vec<StreamChunk> = stream.map(Result::unwrap).collect().await;

        assert_eq!(chunks.iter().filter(|c| c.done).count(), 1);
        assert!(chunks.last().unwrap().done);

        chunks.into_iter().map(|c| c.content).collect()
    }

    #[tokio::test]
    async fn test_openai_stream_matches_chat() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(serde_json::json!({"stream": true})))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                concat!(
                    "data: {\"choices\":[{\"delta\":{\"content\":\"The answer\"}}]}\n\n",
                    "data: {\"choices\":[{\"delta\":{\"content\":\" is 42\"}}]}\n\n",
                    "data: [DONE]\n\n",
                ),
                "text/event-stream",
            ))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "m1",
                "choices": [{"message": {"content": "The answer is 42"}, "finish_reason": "stop"}],
                "usage": {"total_tokens": 9}
            })))
            .mount(&server)
            .await;

        let gateway = stub_gateway(&server);
        let config = ProviderConfig::new(ProviderId::OpenAi, "m1", "sk-test");

        let blocking = gateway.chat(&[Message::user("Hi")], &config).await.unwrap();
        let streamed = stream_text(&gateway, &config).await;

        assert_eq!(streamed, blocking.content);
    }

    #[tokio::test]
    async fn test_anthropic_stream_matches_chat() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(body_partial_json(serde_json::json!({"stream": true})))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                concat!(
                    "data: {\"type\":\"content_block_delta\",\"delta\":{\"type\":\"text_delta\",\"text\":\"Bonjour\"}}\n\n",
                    "data: {\"type\":\"content_block_delta\",\"delta\":{\"type\":\"text_delta\",\"text\":\" monde\"}}\n\n",
                    "data: {\"type\":\"message_stop\"}\n\n",
                ),
                "text/event-stream",
            ))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "claude",
                "content": [{"type": "text", "text": "Bonjour monde"}],
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 3, "output_tokens": 2}
            })))
            .mount(&server)
            .await;

        let gateway = stub_gateway(&server);
        let config = ProviderConfig::new(ProviderId::Anthropic, "claude", "sk-ant");

        let blocking = gateway.chat(&[Message::user("Hi")], &config).await.unwrap();
        let streamed = stream_text(&gateway, &config).await;

        assert_eq!(blocking.tokens_used, 5);
        assert_eq!(streamed, blocking.content);
    }

    #[tokio::test]
    async fn test_gemini_stream_matches_chat() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path_regex(r":streamGenerateContent$"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                concat!(
                    "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Hola\"}]}}]}\n\n",
                    "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\" mundo\"}]},\"finishReason\":\"STOP\"}]}\n\n",
                ),
                "text/event-stream",
            ))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path_regex(r":generateContent$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "Hola mundo"}]}, "finishReason": "STOP"}],
                "usageMetadata": {"totalTokenCount": 6}
            })))
            .mount(&server)
            .await;

        let gateway = stub_gateway(&server);
        let config = ProviderConfig::new(ProviderId::Google, "gemini-1.5-flash", "g-key");

        let blocking = gateway.chat(&[Message::user("Hi")], &config).await.unwrap();
        let streamed = stream_text(&gateway, &config).await;

        assert_eq!(blocking.tokens_used, 6);
        assert_eq!(streamed, blocking.content);
    }

    #[tokio::test]
    async fn test_custom_provider_is_unknown() {
        let gateway = gateway(LlmSettings::default());
        let config = ProviderConfig::new(ProviderId::Custom, "local", "key");

        let err = gateway.chat(&[Message::user("Hi")], &config).await.unwrap_err();
        assert!(matches!(err, DomainError::UnknownProvider { .. }));

        let err = gateway
            .validate_api_key(ProviderId::Custom, "key")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::UnknownProvider { .. }));
    }

    #[tokio::test]
    async fn test_validate_api_key_unreachable_host_is_false() {
        // Port 9 (discard) on loopback has nothing listening
        let gateway = gateway(LlmSettings::default().with_base_url("http://127.0.0.1:9"));

        for provider in [ProviderId::OpenAi, ProviderId::Anthropic, ProviderId::Google] {
            assert!(!gateway.validate_api_key(provider, "some-key").await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_validate_api_key_blank_key_is_false() {
        let gateway = gateway(LlmSettings::default());

        assert!(!gateway.validate_api_key(ProviderId::OpenAi, "  ").await.unwrap());
    }

    #[tokio::test]
    async fn test_stream_error_before_first_chunk() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": {"message": "Rate limit reached"}
            })))
            .mount(&server)
            .await;

        let gateway = stub_gateway(&server);
        let config = ProviderConfig::new(ProviderId::OpenAi, "m1", "sk-test");

        let err = match gateway.stream(&[Message::user("Hi")], &config).await {
            Ok(_) => panic!("expected the stream to fail before opening"),
            Err(e) => e,
        };
        assert_eq!(err.to_string(), "Rate limit reached");
    }

    #[test]
    fn test_catalogs() {
        let gateway = gateway(LlmSettings::default());

        assert!(gateway.available_models(ProviderId::OpenAi).contains(&"gpt-4o"));
        assert!(gateway.available_models(ProviderId::Custom).is_empty());
        assert_eq!(gateway.available_providers().len(), 4);
    }
}
