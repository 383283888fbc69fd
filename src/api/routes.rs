/*
 * Responsibility
 * - URL layout
 * - Health and public endpoints sit in the permissive tier
 * - Staff and auth endpoints sit in the strict tier (see services::access)
 */
use axum::{
    Router,
    routing::{any, get},
};

use crate::api::handlers::{
    public::{health, public_info},
    staff::{create_report, list_reports, me, open_echo, session},
};
use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/public/info", get(public_info))
        .route("/staff/open/{*rest}", any(open_echo))
        .route("/staff/me", get(me))
        .route("/staff/reports", get(list_reports).post(create_report))
        .route("/api/auth/session", get(session))
        .fallback(|| async { AppError::NotFound })
}
