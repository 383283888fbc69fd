/*
 * Responsibility
 * - Strict-tier endpoints: identity echo, reports, session details
 * - Staff open paths stay reachable without a token
 */
use axum::{
    Extension, Json,
    extract::Path,
    http::{Method, StatusCode},
    response::IntoResponse,
};
use serde_json::json;

use crate::api::dto::reports::{
    CreateReportRequest, CreateReportResponse, ListReportsResponse, ReportSummary,
};
use crate::api::extractors::CurrentIdentity;
use crate::error::AppError;
use crate::services::auth::SecurityContext;

pub async fn open_echo(method: Method, Path(rest): Path<String>) -> impl IntoResponse {
    Json(json!({
        "method": method.as_str(),
        "path": format!("/staff/open/{rest}"),
    }))
}

pub async fn me(CurrentIdentity(identity): CurrentIdentity) -> impl IntoResponse {
    Json(identity)
}

pub async fn list_reports(CurrentIdentity(identity): CurrentIdentity) -> impl IntoResponse {
    Json(ListReportsResponse {
        reports: vec![
            ReportSummary {
                id: 1,
                title: "Monthly rentals",
            },
            ReportSummary {
                id: 2,
                title: "Late returns",
            },
        ],
        requested_by: identity.username,
    })
}

pub async fn create_report(
    CurrentIdentity(identity): CurrentIdentity,
    Json(req): Json<CreateReportRequest>,
) -> impl IntoResponse {
    (
        StatusCode::ACCEPTED,
        Json(CreateReportResponse {
            title: req.title,
            requested_by: identity.username,
        }),
    )
}

pub async fn session(
    Extension(context): Extension<SecurityContext>,
) -> Result<impl IntoResponse, AppError> {
    let authentication = context.authentication().ok_or(AppError::Unauthorized)?;

    Ok(Json(json!({
        "identity": authentication.identity,
        "request_id": authentication.details.request_id,
        "remote_addr": authentication.details.remote_addr,
    })))
}
