//! API error envelope
//!
//! Every failure leaves the service as `{"error": {"message", "type"}}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::domain::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorType {
    InvalidRequestError,
    PermissionError,
    NotFoundError,
    ProviderError,
    ServerError,
}

impl std::fmt::Display for ApiErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequestError => write!(f, "invalid_request_error"),
            Self::PermissionError => write!(f, "permission_error"),
            Self::NotFoundError => write!(f, "not_found_error"),
            Self::ProviderError => write!(f, "provider_error"),
            Self::ServerError => write!(f, "server_error"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: ApiErrorType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, error_type: ApiErrorType, message: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                error: ApiErrorDetail {
                    message: message.into(),
                    error_type,
                    code: None,
                },
            },
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.response.error.code = Some(code.into());
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ApiErrorType::InvalidRequestError, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, ApiErrorType::PermissionError, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ApiErrorType::NotFoundError, message)
    }

    /// Upstream vendor failure; the vendor's own text is relayed
    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, ApiErrorType::ProviderError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, ApiErrorType::ServerError, message)
    }

    pub fn message(&self) -> &str {
        &self.response.error.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation { message } => Self::bad_request(message),
            DomainError::Configuration { message } => {
                Self::bad_request(message).with_code("configuration_error")
            }
            DomainError::UnknownProvider { provider } => {
                Self::bad_request(format!("Unknown provider: {}", provider))
                    .with_code("unknown_provider")
            }
            DomainError::Conflict { message } => Self::bad_request(message),
            DomainError::NotFound { message } => Self::not_found(message),
            DomainError::Forbidden { message } => Self::forbidden(message),
            DomainError::Provider { message, .. } => Self::provider(message),
            err @ DomainError::Transport { .. } => Self::provider(err.to_string()),
            DomainError::Crypto { message } => {
                // Crypto detail stays in the logs
                error!(error = %message, "Secret handling failed");
                Self::internal("Failed to read chatbot credentials")
            }
            DomainError::Storage { message } => Self::internal(message),
            DomainError::Internal { message } => Self::internal(message),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.response.error.error_type, self.response.error.message
        )
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: DomainError) -> StatusCode {
        ApiError::from(err).status
    }

    #[test]
    fn test_domain_error_status_mapping() {
        assert_eq!(status_of(DomainError::validation("x")), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(DomainError::configuration("x")), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(DomainError::unknown_provider("x")), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(DomainError::not_found("x")), StatusCode::NOT_FOUND);
        assert_eq!(status_of(DomainError::forbidden("x")), StatusCode::FORBIDDEN);
        assert_eq!(
            status_of(DomainError::provider("openai", "x")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(DomainError::transport("openai", "x")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(status_of(DomainError::crypto("x")), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_of(DomainError::storage("x")), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_of(DomainError::internal("x")), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_provider_message_is_relayed() {
        let err = ApiError::from(DomainError::provider("openai", "Incorrect API key provided"));

        assert_eq!(err.message(), "Incorrect API key provided");
        assert_eq!(err.response.error.error_type, ApiErrorType::ProviderError);
    }

    #[test]
    fn test_crypto_detail_is_hidden() {
        let err = ApiError::from(DomainError::crypto("tag mismatch for key 1234"));

        assert!(!err.message().contains("1234"));
    }

    #[test]
    fn test_error_serialization() {
        let err = ApiError::not_found("Chatbot not found");
        let json = serde_json::to_value(&err.response).unwrap();

        assert_eq!(json["error"]["type"], "not_found_error");
        assert_eq!(json["error"]["message"], "Chatbot not found");
        assert!(json["error"].get("code").is_none());
    }
}
