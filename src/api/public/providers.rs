//! Provider catalog and key validation endpoints

use axum::extract::{Path, State};

use crate::api::state::AppState;
use crate::api::types::{
    ApiError, Json, ProviderModelsResponse, ProvidersResponse, ValidateKeyRequest,
    ValidateKeyResponse,
};
use crate::domain::ProviderId;

/// GET /api/providers
pub async fn list_providers(State(state): State<AppState>) -> Json<ProvidersResponse> {
    Json(ProvidersResponse {
        providers: state.gateway.available_providers(),
    })
}

/// GET /api/providers/{provider}/models
pub async fn list_models(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> Result<Json<ProviderModelsResponse>, ApiError> {
    let provider: ProviderId = provider.parse()?;

    Ok(Json(ProviderModelsResponse {
        provider,
        models: state.gateway.available_models(provider),
    }))
}

/// POST /api/providers/{provider}/validate-key
///
/// The key is only forwarded to the vendor probe; it is never logged or stored.
pub async fn validate_key(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Json(request): Json<ValidateKeyRequest>,
) -> Result<Json<ValidateKeyResponse>, ApiError> {
    let provider: ProviderId = provider.parse()?;
    let valid = state
        .gateway
        .validate_api_key(provider, &request.api_key)
        .await?;

    Ok(Json(ValidateKeyResponse { valid }))
}
