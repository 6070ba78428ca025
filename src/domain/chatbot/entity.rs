//! Chatbot entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::llm::ProviderId;
use crate::domain::storage::{StorageEntity, StorageKey};

/// Chatbot identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatbotId(String);

impl ChatbotId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl StorageKey for ChatbotId {
    fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChatbotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Persisted chatbot configuration
///
/// The provider key is only ever held encrypted here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chatbot {
    id: ChatbotId,
    name: String,
    is_active: bool,
    provider: ProviderId,
    model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    encrypted_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_prompt: Option<String>,
    /// Widget embedding allowlist; empty means any origin
    #[serde(default)]
    allowed_domains: Vec<String>,
    created_at: DateTime<Utc>,
}

impl Chatbot {
    pub fn new(
        id: ChatbotId,
        name: impl Into<String>,
        provider: ProviderId,
        model: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            is_active: true,
            provider,
            model: model.into(),
            encrypted_api_key: None,
            temperature: None,
            max_tokens: None,
            system_prompt: None,
            allowed_domains: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_encrypted_api_key(mut self, encrypted: impl Into<String>) -> Self {
        self.encrypted_api_key = Some(encrypted.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_allowed_domains(mut self, domains: Vec<String>) -> Self {
        self.allowed_domains = domains;
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.is_active = active;
        self
    }

    pub fn id(&self) -> &ChatbotId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn provider(&self) -> ProviderId {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn encrypted_api_key(&self) -> Option<&str> {
        self.encrypted_api_key.as_deref()
    }

    pub fn temperature(&self) -> Option<f32> {
        self.temperature
    }

    pub fn max_tokens(&self) -> Option<u32> {
        self.max_tokens
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    pub fn allowed_domains(&self) -> &[String] {
        &self.allowed_domains
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Check a request origin against the allowlist.
    ///
    /// An empty allowlist accepts everything. Otherwise the origin host must
    /// equal an allowed domain or be one of its subdomains.
    pub fn allows_origin(&self, origin: Option<&str>) -> bool {
        if self.allowed_domains.is_empty() {
            return true;
        }

        let Some(host) = origin.and_then(origin_host) else {
            return false;
        };

        self.allowed_domains.iter().any(|domain| {
            let domain = domain.trim().trim_start_matches("*.").to_ascii_lowercase();
            !domain.is_empty() && (host == domain || host.ends_with(&format!(".{}", domain)))
        })
    }
}

impl StorageEntity for Chatbot {
    type Key = ChatbotId;

    fn key(&self) -> &Self::Key {
        &self.id
    }
}

/// Extract the lowercase host from an origin or referer value
fn origin_host(origin: &str) -> Option<String> {
    let without_scheme = origin
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(origin);
    let authority = without_scheme.split(['/', '?', '#']).next()?;
    let host = authority.rsplit('@').next()?;
    let host = host.split(':').next()?.trim();

    if host.is_empty() {
        None
    } else {
        Some(host.to_ascii_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bot() -> Chatbot {
        Chatbot::new(ChatbotId::new("bot1"), "Support", ProviderId::OpenAi, "gpt-4o")
    }

    #[test]
    fn test_defaults() {
        let bot = bot();
        assert!(bot.is_active());
        assert!(bot.encrypted_api_key().is_none());
        assert!(bot.allowed_domains().is_empty());
        assert_eq!(bot.key().as_str(), "bot1");
    }

    #[test]
    fn test_empty_allowlist_accepts_any_origin() {
        assert!(bot().allows_origin(None));
        assert!(bot().allows_origin(Some("https://anything.test")));
    }

    #[test]
    fn test_allowlist_matches_host_and_subdomains() {
        let bot = bot().with_allowed_domains(vec!["example.com".to_string()]);

        assert!(bot.allows_origin(Some("https://example.com")));
        assert!(bot.allows_origin(Some("https://shop.example.com:8443")));
        assert!(bot.allows_origin(Some("http://EXAMPLE.com/page?x=1")));
        assert!(!bot.allows_origin(Some("https://notexample.com")));
        assert!(!bot.allows_origin(Some("https://example.com.evil.test")));
        assert!(!bot.allows_origin(None));
    }

    #[test]
    fn test_origin_host_parsing() {
        assert_eq!(origin_host("https://a.b.c:80/x"), Some("a.b.c".to_string()));
        assert_eq!(origin_host("example.org"), Some("example.org".to_string()));
        assert_eq!(origin_host("https://"), None);
    }
}
