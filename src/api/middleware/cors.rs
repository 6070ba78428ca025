//! CORS for the embeddable widget endpoints
//!
//! Widgets are served from customer sites, so the request origin is mirrored
//! back. Per-chatbot allowlists are enforced by the chat handler itself.

use std::time::Duration;

use axum::http::{header, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::api::public::chat::CONVERSATION_ID_HEADER;

const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(86400);

/// CORS layer for the `/api` routes; also answers `OPTIONS` preflights
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([CONVERSATION_ID_HEADER])
        .max_age(PREFLIGHT_MAX_AGE)
}
