use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::{RequestBuilder, Response};
use tracing::debug;

use super::config::LlmSettings;
use crate::domain::{DomainError, ProviderId};

/// Stream type for HTTP response bodies
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, DomainError>> + Send>>;

/// Shared HTTP client used by every vendor adapter
///
/// Holds no per-call state; the API key travels with each request.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    request_timeout: Duration,
    stream_timeout: Duration,
    probe_timeout: Duration,
}

impl HttpClient {
    pub fn new(settings: &LlmSettings) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout())
            .build()
            .map_err(|e| {
                DomainError::configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            request_timeout: settings.request_timeout(),
            stream_timeout: settings.stream_timeout(),
            probe_timeout: settings.probe_timeout(),
        })
    }

    /// POST a JSON body and decode the JSON answer
    pub async fn post_json(
        &self,
        provider: ProviderId,
        url: &str,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, DomainError> {
        let request = with_headers(self.client.post(url), headers)
            .timeout(self.request_timeout)
            .json(body);
        let response = send(provider, request).await?;

        response.json().await.map_err(|e| {
            DomainError::transport(
                provider.as_str(),
                format!("Failed to read response body: {}", e.without_url()),
            )
        })
    }

    /// POST a JSON body and hand back the raw response body as a byte stream
    pub async fn post_json_stream(
        &self,
        provider: ProviderId,
        url: &str,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<ByteStream, DomainError> {
        let request = with_headers(self.client.post(url), headers)
            .timeout(self.stream_timeout)
            .json(body);
        let response = send(provider, request).await?;

        let stream = response.bytes_stream().map(move |result| {
            result.map_err(|e| {
                DomainError::transport(
                    provider.as_str(),
                    format!("Stream error: {}", e.without_url()),
                )
            })
        });

        Ok(Box::pin(stream))
    }

    /// GET `url` and report whether the status was a success
    pub async fn probe_get(
        &self,
        provider: ProviderId,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<bool, DomainError> {
        let request = with_headers(self.client.get(url), headers).timeout(self.probe_timeout);
        probe(provider, request).await
    }

    /// POST `body` to `url` and report whether the status was a success
    pub async fn probe_post(
        &self,
        provider: ProviderId,
        url: &str,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<bool, DomainError> {
        let request = with_headers(self.client.post(url), headers)
            .timeout(self.probe_timeout)
            .json(body);
        probe(provider, request).await
    }
}

fn with_headers(mut request: RequestBuilder, headers: &[(&str, &str)]) -> RequestBuilder {
    for (key, value) in headers {
        request = request.header(*key, *value);
    }
    request
}

async fn send(provider: ProviderId, request: RequestBuilder) -> Result<Response, DomainError> {
    // without_url: Gemini carries the key in the query string
    let response = request.send().await.map_err(|e| {
        DomainError::transport(
            provider.as_str(),
            format!("Request failed: {}", e.without_url()),
        )
    })?;

    let status = response.status();

    if !status.is_success() {
        let error_body = response.text().await.unwrap_or_default();
        return Err(vendor_error(provider, status.as_u16(), &error_body));
    }

    Ok(response)
}

async fn probe(provider: ProviderId, request: RequestBuilder) -> Result<bool, DomainError> {
    let response = request.send().await.map_err(|e| {
        DomainError::transport(
            provider.as_str(),
            format!("Probe failed: {}", e.without_url()),
        )
    })?;

    debug!(provider = %provider, status = response.status().as_u16(), "Key probe answered");

    Ok(response.status().is_success())
}

/// Build the error for a non-success vendor status.
///
/// Uses the vendor's own message when the body carries one, otherwise a
/// generic status-coded message.
pub fn vendor_error(provider: ProviderId, status: u16, body: &str) -> DomainError {
    let message = extract_error_message(body)
        .unwrap_or_else(|| format!("{} API error: {}", provider.display_name(), status));

    DomainError::provider(provider.as_str(), message)
}

fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;

    let message = value
        .pointer("/error/message")
        .or_else(|| value.get("error").filter(|e| e.is_string()))
        .or_else(|| value.get("message"))
        .and_then(|m| m.as_str())?
        .trim();

    if message.is_empty() {
        None
    } else {
        Some(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vendor_error_uses_vendor_message() {
        let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#;
        let error = vendor_error(ProviderId::OpenAi, 401, body);

        assert_eq!(error.to_string(), "Incorrect API key provided");
    }

    #[test]
    fn test_vendor_error_generic_when_unparseable() {
        let error = vendor_error(ProviderId::Anthropic, 502, "<html>Bad gateway</html>");
        assert_eq!(error.to_string(), "Anthropic API error: 502");

        let error = vendor_error(ProviderId::Google, 500, "");
        assert_eq!(error.to_string(), "Google Gemini API error: 500");
    }

    #[test]
    fn test_vendor_error_string_error_field() {
        let error = vendor_error(ProviderId::OpenAi, 400, r#"{"error":"bad request"}"#);
        assert_eq!(error.to_string(), "bad request");
    }

    #[test]
    fn test_vendor_error_is_provider_variant() {
        let error = vendor_error(ProviderId::Google, 403, r#"{"error":{"message":"denied"}}"#);
        assert!(matches!(error, DomainError::Provider { ref provider, .. } if provider == "google"));
    }
}
