/*
 * Responsibility
 * - GET /health (liveness)
 * - GET /public/info (permissive tier; never runs token authentication)
 */
use axum::{Extension, Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::services::auth::SecurityContext;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

pub async fn public_info(Extension(context): Extension<SecurityContext>) -> impl IntoResponse {
    Json(json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "authenticated": context.is_authenticated(),
    }))
}
