use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Unknown provider: {provider}")]
    UnknownProvider { provider: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Upstream vendor answered with a non-success status
    #[error("{message}")]
    Provider { provider: String, message: String },

    /// Network-level failure talking to a vendor (connect, body read)
    #[error("{provider} transport error: {message}")]
    Transport { provider: String, message: String },

    #[error("Crypto error: {message}")]
    Crypto { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn unknown_provider(provider: impl Into<String>) -> Self {
        Self::UnknownProvider {
            provider: provider.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn transport(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn crypto(message: impl Into<String>) -> Self {
        Self::Crypto {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let error = DomainError::not_found("Chatbot 'bot1' not found");
        assert_eq!(error.to_string(), "Not found: Chatbot 'bot1' not found");
    }

    #[test]
    fn test_unknown_provider_error() {
        let error = DomainError::unknown_provider("made-up-id");
        assert_eq!(error.to_string(), "Unknown provider: made-up-id");
    }

    #[test]
    fn test_provider_error_relays_vendor_text() {
        let error = DomainError::provider("openai", "Incorrect API key provided");
        assert_eq!(error.to_string(), "Incorrect API key provided");
    }

    #[test]
    fn test_transport_error() {
        let error = DomainError::transport("anthropic", "connection refused");
        assert_eq!(
            error.to_string(),
            "anthropic transport error: connection refused"
        );
    }
}
