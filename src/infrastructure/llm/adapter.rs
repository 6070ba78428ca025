//! Closed set of vendor adapters behind one dispatch point

use std::borrow::Cow;

use super::anthropic::AnthropicAdapter;
use super::gemini::GeminiAdapter;
use super::openai::OpenAiAdapter;
use crate::domain::{DomainError, LlmResponse, LlmStream, Message, ProviderConfig, ProviderId};

/// One adapter per supported vendor
///
/// Adapters hold no per-call state and are shared across concurrent calls.
#[derive(Debug, Clone)]
pub enum ProviderAdapter {
    OpenAi(OpenAiAdapter),
    Anthropic(AnthropicAdapter),
    Google(GeminiAdapter),
}

impl ProviderAdapter {
    pub fn provider_id(&self) -> ProviderId {
        match self {
            Self::OpenAi(_) => ProviderId::OpenAi,
            Self::Anthropic(_) => ProviderId::Anthropic,
            Self::Google(_) => ProviderId::Google,
        }
    }

    pub async fn chat(
        &self,
        messages: &[Message],
        config: &ProviderConfig,
    ) -> Result<LlmResponse, DomainError> {
        match self {
            Self::OpenAi(adapter) => adapter.chat(messages, config).await,
            Self::Anthropic(adapter) => adapter.chat(messages, config).await,
            Self::Google(adapter) => adapter.chat(messages, config).await,
        }
    }

    /// Open a new upstream connection and return its chunk sequence
    pub async fn stream(
        &self,
        messages: &[Message],
        config: &ProviderConfig,
    ) -> Result<LlmStream, DomainError> {
        match self {
            Self::OpenAi(adapter) => adapter.stream(messages, config).await,
            Self::Anthropic(adapter) => adapter.stream(messages, config).await,
            Self::Google(adapter) => adapter.stream(messages, config).await,
        }
    }

    /// True only when the vendor accepted the key; every failure reads as false
    pub async fn validate_api_key(&self, api_key: &str) -> bool {
        match self {
            Self::OpenAi(adapter) => adapter.validate_api_key(api_key).await,
            Self::Anthropic(adapter) => adapter.validate_api_key(api_key).await,
            Self::Google(adapter) => adapter.validate_api_key(api_key).await,
        }
    }
}

/// Messages to send, with the configured system prompt prepended when the
/// caller did not already supply a system message.
pub(super) fn prepare_messages<'a>(
    messages: &'a [Message],
    config: &ProviderConfig,
) -> Cow<'a, [Message]> {
    match config.system_prompt.as_deref() {
        Some(prompt) if !prompt.trim().is_empty() && !messages.iter().any(Message::is_system) => {
            let mut prepared = Vec::with_capacity(messages.len() + 1);
            prepared.push(Message::system(prompt));
            prepared.extend_from_slice(messages);
            Cow::Owned(prepared)
        }
        _ => Cow::Borrowed(messages),
    }
}

/// Separate system text from the conversational turns, for vendors that take
/// the system prompt as a top-level field.
pub(super) fn split_system(messages: &[Message]) -> (Option<String>, Vec<&Message>) {
    let (system, turns): (Vec<&Message>, Vec<&Message>) =
        messages.iter().partition(|m| m.is_system());

    let system_content = system
        .iter()
        .map(|m| m.content())
        .collect::<Vec<_>>()
        .join("\n\n");

    let system = if system_content.is_empty() {
        None
    } else {
        Some(system_content)
    };

    (system, turns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ProviderConfig {
        ProviderConfig::new(ProviderId::OpenAi, "gpt-4o", "sk-test")
    }

    #[test]
    fn test_prepare_messages_prepends_config_prompt() {
        let messages = vec![Message::user("Hi")];
        let config = config().with_system_prompt("Be brief");

        let prepared = prepare_messages(&messages, &config);

        assert_eq!(prepared.len(), 2);
        assert_eq!(prepared[0], Message::system("Be brief"));
        assert_eq!(prepared[1], Message::user("Hi"));
    }

    #[test]
    fn test_prepare_messages_keeps_existing_system_message() {
        let messages = vec![Message::system("Assembled"), Message::user("Hi")];
        let config = config().with_system_prompt("Be brief");

        let prepared = prepare_messages(&messages, &config);

        assert!(matches!(prepared, Cow::Borrowed(_)));
        assert_eq!(prepared[0].content(), "Assembled");
    }

    #[test]
    fn test_split_system() {
        let messages = vec![
            Message::system("One"),
            Message::user("Hi"),
            Message::system("Two"),
            Message::assistant("Hello"),
        ];

        let (system, turns) = split_system(&messages);

        assert_eq!(system.as_deref(), Some("One\n\nTwo"));
        assert_eq!(turns.len(), 2);
        assert!(turns.iter().all(|m| !m.is_system()));
    }

    #[test]
    fn test_split_system_without_system_messages() {
        let messages = vec![Message::user("Hi")];
        let (system, turns) = split_system(&messages);

        assert!(system.is_none());
        assert_eq!(turns.len(), 1);
    }
}
