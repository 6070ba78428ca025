//! Public widget-facing endpoints, mounted under `/api`

pub mod chat;
pub mod providers;

use axum::{
    routing::{get, post},
    Router,
};

use super::middleware::cors_layer;
use super::state::AppState;

pub fn create_public_router() -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat::send_message))
        .route("/providers", get(providers::list_providers))
        .route("/providers/{provider}/models", get(providers::list_models))
        .route(
            "/providers/{provider}/validate-key",
            post(providers::validate_key),
        )
        .layer(cors_layer())
}
