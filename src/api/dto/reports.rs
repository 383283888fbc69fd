use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub id: u32,
    pub title: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct CreateReportRequest {
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct CreateReportResponse {
    pub title: String,
    pub requested_by: String,
}

#[derive(Debug, Serialize)]
pub struct ListReportsResponse {
    pub reports: Vec<ReportSummary>,
    pub requested_by: String,
}
