use serde::{Deserialize, Serialize};
use tracing::debug;

use super::adapter::prepare_messages;
use super::http_client::HttpClient;
use super::sse::{spawn_chunk_stream, SseEvent};
use crate::domain::{
    DomainError, LlmResponse, LlmStream, Message, ProviderConfig, ProviderId,
};

/// OpenAI chat completions adapter
#[derive(Debug, Clone)]
pub struct OpenAiAdapter {
    client: HttpClient,
    base_url: String,
    stream_buffer: usize,
}

impl OpenAiAdapter {
    pub fn new(client: HttpClient, base_url: impl Into<String>, stream_buffer: usize) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            base_url,
            stream_buffer,
        }
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn models_url(&self) -> String {
        format!("{}/v1/models", self.base_url)
    }

    fn build_request(
        &self,
        messages: &[Message],
        config: &ProviderConfig,
        stream: bool,
    ) -> serde_json::Value {
        let prepared = prepare_messages(messages, config);
        let messages: Vec<OpenAiMessage> = prepared
            .iter()
            .map(OpenAiMessage::from_domain)
            .collect();

        let mut body = serde_json::json!({
            "model": config.model,
            "messages": messages,
            "stream": stream,
        });

        if let Some(temp) = config.temperature {
            body["temperature"] = serde_json::json!(temp);
        }

        if let Some(max_tokens) = config.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        body
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<LlmResponse, DomainError> {
        let response: OpenAiResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("openai", format!("Failed to parse response: {}", e))
        })?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::provider("openai", "No choices in response"))?;

        let mut llm_response = LlmResponse::new(
            choice.message.content.unwrap_or_default(),
            response.model,
        );

        if let Some(usage) = response.usage {
            llm_response = llm_response.with_tokens_used(usage.total_tokens);
        }

        if let Some(reason) = choice.finish_reason {
            llm_response = llm_response.with_finish_reason(reason);
        }

        Ok(llm_response)
    }

    pub async fn chat(
        &self,
        messages: &[Message],
        config: &ProviderConfig,
    ) -> Result<LlmResponse, DomainError> {
        let auth = bearer(config);
        let body = self.build_request(messages, config, false);
        let response = self
            .client
            .post_json(
                ProviderId::OpenAi,
                &self.chat_completions_url(),
                &[("Authorization", auth.as_str())],
                &body,
            )
            .await?;

        self.parse_response(response)
    }

    pub async fn stream(
        &self,
        messages: &[Message],
        config: &ProviderConfig,
    ) -> Result<LlmStream, DomainError> {
        let auth = bearer(config);
        let body = self.build_request(messages, config, true);
        let bytes = self
            .client
            .post_json_stream(
                ProviderId::OpenAi,
                &self.chat_completions_url(),
                &[("Authorization", auth.as_str())],
                &body,
            )
            .await?;

        Ok(spawn_chunk_stream(
            ProviderId::OpenAi,
            bytes,
            self.stream_buffer,
            parse_stream_payload,
        ))
    }

    pub async fn validate_api_key(&self, api_key: &str) -> bool {
        let auth = format!("Bearer {}", api_key);

        self.client
            .probe_get(
                ProviderId::OpenAi,
                &self.models_url(),
                &[("Authorization", auth.as_str())],
            )
            .await
            .unwrap_or_else(|e| {
                debug!(error = %e, "OpenAI key probe failed");
                false
            })
    }
}

fn bearer(config: &ProviderConfig) -> String {
    format!("Bearer {}", config.api_key.expose())
}

fn parse_stream_payload(data: &str) -> Option<SseEvent> {
    if data == "[DONE]" {
        return Some(SseEvent::done());
    }

    let chunk: OpenAiStreamChunk = serde_json::from_str(data).ok()?;

    if let Some(error) = chunk.error {
        return Some(SseEvent::error(error.message));
    }

    let choice = chunk.choices.into_iter().next()?;

    Some(SseEvent {
        delta: choice.delta.content,
        ..SseEvent::default()
    })
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct OpenAiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> OpenAiMessage<'a> {
    fn from_domain(message: &'a Message) -> Self {
        Self {
            role: message.role().as_str(),
            content: message.content(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    model: String,
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    #[serde(default)]
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiStreamChunk {
    #[serde(default)]
    choices: Vec<OpenAiStreamChoice>,
    error: Option<OpenAiStreamError>,
}

#[derive(Debug, Deserialize)]
struct OpenAiStreamError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiStreamChoice {
    #[serde(default)]
    delta: OpenAiDelta,
}

#[derive(Debug, Default, Deserialize)]
struct OpenAiDelta {
    content: Option<String>,
}
