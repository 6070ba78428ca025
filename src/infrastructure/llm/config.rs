//! LLM gateway configuration

use std::time::Duration;

use serde::Deserialize;

/// Timeouts, buffering and vendor endpoints for the gateway
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Deadline for a blocking completion round trip
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Deadline for a whole streaming response, body included
    #[serde(default = "default_stream_timeout_secs")]
    pub stream_timeout_secs: u64,
    /// Deadline for API key validation probes
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
    /// Capacity of the chunk channel between upstream reader and consumer
    #[serde(default = "default_stream_buffer_size")]
    pub stream_buffer_size: usize,
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,
    #[serde(default = "default_anthropic_base_url")]
    pub anthropic_base_url: String,
    #[serde(default = "default_google_base_url")]
    pub google_base_url: String,
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_stream_timeout_secs() -> u64 {
    300
}

fn default_probe_timeout_secs() -> u64 {
    15
}

fn default_stream_buffer_size() -> usize {
    32
}

fn default_openai_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_anthropic_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_google_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            stream_timeout_secs: default_stream_timeout_secs(),
            probe_timeout_secs: default_probe_timeout_secs(),
            stream_buffer_size: default_stream_buffer_size(),
            openai_base_url: default_openai_base_url(),
            anthropic_base_url: default_anthropic_base_url(),
            google_base_url: default_google_base_url(),
        }
    }
}

impl LlmSettings {
    /// Point every vendor at the same base URL (useful for local stubs)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.openai_base_url = base_url.clone();
        self.anthropic_base_url = base_url.clone();
        self.google_base_url = base_url;
        self
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn stream_timeout(&self) -> Duration {
        Duration::from_secs(self.stream_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = LlmSettings::default();

        assert_eq!(settings.request_timeout(), Duration::from_secs(120));
        assert_eq!(settings.stream_buffer_size, 32);
        assert_eq!(settings.openai_base_url, "https://api.openai.com");
    }

    #[test]
    fn test_with_base_url_overrides_all_vendors() {
        let settings = LlmSettings::default().with_base_url("http://127.0.0.1:9000");

        assert_eq!(settings.openai_base_url, "http://127.0.0.1:9000");
        assert_eq!(settings.anthropic_base_url, "http://127.0.0.1:9000");
        assert_eq!(settings.google_base_url, "http://127.0.0.1:9000");
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let settings: LlmSettings =
            serde_json::from_str(r#"{"request_timeout_secs": 5}"#).unwrap();

        assert_eq!(settings.request_timeout_secs, 5);
        assert_eq!(settings.stream_timeout_secs, 300);
    }
}
