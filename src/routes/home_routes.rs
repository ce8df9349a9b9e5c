use axum::{Json, Router, extract::State, routing::get};
use chrono::Utc;

use crate::adapter::DashboardStats;
use crate::error::ApiError;
use crate::middleware::auth_context::AuthContext;
use crate::models::{ApiOk, AppState};
use crate::tenant::Role;

#[derive(serde::Serialize)]
pub struct HomeData {
    pub view: String,
    pub clinic_name: Option<String>,
    pub unread_notifications: i64,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/home", get(home))
        .route("/dashboard", get(dashboard))
}

pub async fn home(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<ApiOk<HomeData>>, ApiError> {
    let view = match auth.role {
        Role::SuperAdmin => "super_admin",
        Role::Admin => "admin",
    };

    let adapter = state.adapter();
    let tenant = auth.tenant();
    let clinic = adapter.get_clinic(&tenant).await?;
    let unread = adapter.unread_notification_count(&tenant).await;

    Ok(Json(ApiOk {
        data: HomeData {
            view: view.to_string(),
            clinic_name: clinic.clinic_name,
            unread_notifications: unread,
        },
    }))
}

pub async fn dashboard(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<ApiOk<DashboardStats>>, ApiError> {
    let stats = state.adapter().dashboard(&auth.tenant(), Utc::now()).await?;
    Ok(Json(ApiOk { data: stats }))
}
