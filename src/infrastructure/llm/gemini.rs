use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::adapter::{prepare_messages, split_system};
use super::http_client::HttpClient;
use super::sse::{spawn_chunk_stream, SseEvent};
use crate::domain::{
    DomainError, LlmResponse, LlmStream, Message, MessageRole, ProviderConfig, ProviderId,
};

/// Google Gemini generateContent adapter
///
/// Gemini authenticates with a `key` query parameter, so URLs built here
/// carry the secret and must never be logged.
#[derive(Debug, Clone)]
pub struct GeminiAdapter {
    client: HttpClient,
    base_url: String,
    stream_buffer: usize,
}

impl GeminiAdapter {
    pub fn new(client: HttpClient, base_url: impl Into<String>, stream_buffer: usize) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            base_url,
            stream_buffer,
        }
    }

    fn url(&self, path: &str, params: &[(&str, &str)]) -> Result<String, DomainError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path)).map_err(|_| {
            DomainError::configuration(format!("Invalid Gemini base URL: {}", self.base_url))
        })?;

        url.query_pairs_mut().extend_pairs(params);

        Ok(url.into())
    }

    fn generate_url(&self, model: &str, api_key: &str) -> Result<String, DomainError> {
        self.url(
            &format!("/v1beta/models/{}:generateContent", model),
            &[("key", api_key)],
        )
    }

    fn stream_url(&self, model: &str, api_key: &str) -> Result<String, DomainError> {
        self.url(
            &format!("/v1beta/models/{}:streamGenerateContent", model),
            &[("alt", "sse"), ("key", api_key)],
        )
    }

    fn build_request(&self, messages: &[Message], config: &ProviderConfig) -> serde_json::Value {
        let messages = prepare_messages(messages, config);
        let (system, turns) = split_system(&messages);

        let contents: Vec<GeminiContent> = turns.into_iter().map(GeminiContent::from_domain).collect();

        let mut body = serde_json::json!({ "contents": contents });

        if let Some(system_content) = system {
            body["systemInstruction"] = serde_json::json!({
                "parts": [{ "text": system_content }]
            });
        }

        let mut generation_config = serde_json::Map::new();

        if let Some(temp) = config.temperature {
            generation_config.insert("temperature".to_string(), serde_json::json!(temp));
        }

        if let Some(max_tokens) = config.max_tokens {
            generation_config.insert("maxOutputTokens".to_string(), serde_json::json!(max_tokens));
        }

        if !generation_config.is_empty() {
            body["generationConfig"] = serde_json::Value::Object(generation_config);
        }

        body
    }

    fn parse_response(
        &self,
        json: serde_json::Value,
        model: &str,
    ) -> Result<LlmResponse, DomainError> {
        let response: GeminiResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("google", format!("Failed to parse response: {}", e))
        })?;

        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::provider("google", "No candidates in response"))?;

        let mut llm_response = LlmResponse::new(candidate.text(), model);

        if let Some(usage) = response.usage_metadata {
            llm_response = llm_response.with_tokens_used(usage.total_token_count);
        }

        if let Some(reason) = candidate.finish_reason {
            llm_response = llm_response.with_finish_reason(reason);
        }

        Ok(llm_response)
    }

    pub async fn chat(
        &self,
        messages: &[Message],
        config: &ProviderConfig,
    ) -> Result<LlmResponse, DomainError> {
        let url = self.generate_url(&config.model, config.api_key.expose())?;
        let body = self.build_request(messages, config);
        let response = self
            .client
            .post_json(ProviderId::Google, &url, &[], &body)
            .await?;

        self.parse_response(response, &config.model)
    }

    pub async fn stream(
        &self,
        messages: &[Message],
        config: &ProviderConfig,
    ) -> Result<LlmStream, DomainError> {
        let url = self.stream_url(&config.model, config.api_key.expose())?;
        let body = self.build_request(messages, config);
        let bytes = self
            .client
            .post_json_stream(ProviderId::Google, &url, &[], &body)
            .await?;

        Ok(spawn_chunk_stream(
            ProviderId::Google,
            bytes,
            self.stream_buffer,
            parse_stream_payload,
        ))
    }

    pub async fn validate_api_key(&self, api_key: &str) -> bool {
        let url = match self.url("/v1beta/models", &[("key", api_key)]) {
            Ok(url) => url,
            Err(e) => {
                debug!(error = %e, "Gemini key probe not attempted");
                return false;
            }
        };

        self.client
            .probe_get(ProviderId::Google, &url, &[])
            .await
            .unwrap_or_else(|e| {
                debug!(error = %e, "Gemini key probe failed");
                false
            })
    }
}

/// Gemini has no stop sentinel; a candidate carrying `finishReason` is the last one
fn parse_stream_payload(data: &str) -> Option<SseEvent> {
    let response: GeminiResponse = serde_json::from_str(data).ok()?;

    if let Some(error) = response.error {
        return Some(SseEvent::error(error.message));
    }

    let candidate = response.candidates.into_iter().next()?;

    Some(SseEvent {
        done: candidate.finish_reason.is_some(),
        delta: Some(candidate.text()),
        error: None,
    })
}

// Gemini API types

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    role: &'static str,
    parts: [GeminiPartRef<'a>; 1],
}

#[derive(Debug, Serialize)]
struct GeminiPartRef<'a> {
    text: &'a str,
}

impl<'a> GeminiContent<'a> {
    fn from_domain(message: &'a Message) -> Self {
        let role = match message.role() {
            MessageRole::Assistant => "model",
            MessageRole::User | MessageRole::System => "user",
        };

        Self {
            role,
            parts: [GeminiPartRef {
                text: message.content(),
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
    finish_reason: Option<String>,
}

impl GeminiCandidate {
    fn text(&self) -> String {
        self.content
            .iter()
            .flat_map(|c| c.parts.iter())
            .filter_map(|p| p.text.as_deref())
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    total_token_count: u32,
}
