use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{Datelike, Utc};
use serde::Deserialize;

use crate::{
    error::ApiError,
    middleware::auth_context::AuthContext,
    models::{ApiOk, AppState},
    scheduling::revenue::RevenueReport,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reports", get(get_report))
        .route("/reports/controls.csv", get(export_controls))
}

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

pub async fn get_report(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(q): Query<ReportQuery>,
) -> Result<Json<ApiOk<RevenueReport>>, ApiError> {
    let today = Utc::now().date_naive();
    let report = state
        .adapter()
        .revenue_report(
            &auth.tenant(),
            q.month.unwrap_or(today.month()),
            q.year.unwrap_or(today.year()),
        )
        .await?;
    Ok(Json(ApiOk { data: report }))
}

pub async fn export_controls(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<impl IntoResponse, ApiError> {
    let csv = state.adapter().export_controls_csv(&auth.tenant()).await?;
    let filename = format!("controls-{}.csv", Utc::now().format("%Y-%m-%d"));
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        csv,
    ))
}
