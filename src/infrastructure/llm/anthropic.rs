use serde::{Deserialize, Serialize};
use tracing::debug;

use super::adapter::{prepare_messages, split_system};
use super::http_client::HttpClient;
use super::sse::{spawn_chunk_stream, SseEvent};
use crate::domain::{
    DomainError, LlmResponse, LlmStream, Message, MessageRole, ProviderConfig, ProviderId,
};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 1024;
const PROBE_MODEL: &str = "claude-3-5-haiku-20241022";

/// Anthropic messages API adapter
#[derive(Debug, Clone)]
pub struct AnthropicAdapter {
    client: HttpClient,
    base_url: String,
    stream_buffer: usize,
}

impl AnthropicAdapter {
    pub fn new(client: HttpClient, base_url: impl Into<String>, stream_buffer: usize) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            base_url,
            stream_buffer,
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }

    fn build_request(
        &self,
        messages: &[Message],
        config: &ProviderConfig,
        stream: bool,
    ) -> serde_json::Value {
        let messages = prepare_messages(messages, config);
        let (system, turns) = split_system(&messages);

        let anthropic_messages: Vec<AnthropicMessage> =
            turns.into_iter().map(AnthropicMessage::from_domain).collect();

        let mut body = serde_json::json!({
            "model": config.model,
            "messages": anthropic_messages,
            "max_tokens": config.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            "stream": stream,
        });

        if let Some(system_content) = system {
            body["system"] = serde_json::json!(system_content);
        }

        if let Some(temp) = config.temperature {
            body["temperature"] = serde_json::json!(temp);
        }

        body
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<LlmResponse, DomainError> {
        let response: AnthropicResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("anthropic", format!("Failed to parse response: {}", e))
        })?;

        let content = response
            .content
            .into_iter()
            .filter(|block| block.content_type == "text")
            .filter_map(|block| block.text)
            .collect::<String>();

        let mut llm_response = LlmResponse::new(content, response.model).with_tokens_used(
            response.usage.input_tokens + response.usage.output_tokens,
        );

        if let Some(reason) = response.stop_reason {
            llm_response = llm_response.with_finish_reason(reason);
        }

        Ok(llm_response)
    }

    pub async fn chat(
        &self,
        messages: &[Message],
        config: &ProviderConfig,
    ) -> Result<LlmResponse, DomainError> {
        let body = self.build_request(messages, config, false);
        let response = self
            .client
            .post_json(
                ProviderId::Anthropic,
                &self.messages_url(),
                &headers(config.api_key.expose()),
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
        let body = self.build_request(messages, config, true);
        let bytes = self
            .client
            .post_json_stream(
                ProviderId::Anthropic,
                &self.messages_url(),
                &headers(config.api_key.expose()),
                &body,
            )
            .await?;

        Ok(spawn_chunk_stream(
            ProviderId::Anthropic,
            bytes,
            self.stream_buffer,
            parse_stream_payload,
        ))
    }

    /// Anthropic has no free listing endpoint, so the probe is a 1-token completion
    pub async fn validate_api_key(&self, api_key: &str) -> bool {
        let body = serde_json::json!({
            "model": PROBE_MODEL,
            "max_tokens": 1,
            "messages": [{"role": "user", "content": "Hi"}],
        });

        self.client
            .probe_post(
                ProviderId::Anthropic,
                &self.messages_url(),
                &headers(api_key),
                &body,
            )
            .await
            .unwrap_or_else(|e| {
                debug!(error = %e, "Anthropic key probe failed");
                false
            })
    }
}

fn headers(api_key: &str) -> [(&str, &str); 2] {
    [("x-api-key", api_key), ("anthropic-version", ANTHROPIC_VERSION)]
}

fn parse_stream_payload(data: &str) -> Option<SseEvent> {
    let event: AnthropicStreamEvent = serde_json::from_str(data).ok()?;

    match event.event_type.as_str() {
        "content_block_delta" => {
            let delta = event.delta?;
            if delta.delta_type == "text_delta" {
                delta.text.map(SseEvent::delta)
            } else {
                None
            }
        }
        "message_stop" => Some(SseEvent::done()),
        "error" => {
            let message = event
                .error
                .map(|e| e.message)
                .unwrap_or_else(|| "Anthropic stream error".to_string());
            Some(SseEvent::error(message))
        }
        _ => None,
    }
}

// Anthropic API types

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> AnthropicMessage<'a> {
    fn from_domain(message: &'a Message) -> Self {
        let role = match message.role() {
            MessageRole::Assistant => "assistant",
            // System text was lifted out by split_system
            MessageRole::User | MessageRole::System => "user",
        };

        Self {
            role,
            content: message.content(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    model: String,
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
    #[serde(default)]
    usage: AnthropicUsage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AnthropicUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct AnthropicStreamEvent {
    #[serde(rename = "type")]
    event_type: String,
    delta: Option<StreamDelta>,
    error: Option<AnthropicStreamError>,
}

#[derive(Debug, Deserialize)]
struct AnthropicStreamError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    #[serde(rename = "type", default)]
    delta_type: String,
    text: Option<String>,
}
