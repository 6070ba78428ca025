//! Request and response types for the public API

pub mod chat;
pub mod error;
pub mod json;
pub mod providers;

pub use chat::{ChatRequest, ChatResponse, StreamErrorFrame};
pub use error::{ApiError, ApiErrorResponse, ApiErrorType};
pub use json::Json;
pub use providers::{
    ProviderModelsResponse, ProvidersResponse, ValidateKeyRequest, ValidateKeyResponse,
};
