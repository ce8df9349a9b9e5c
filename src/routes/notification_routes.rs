use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::ApiError,
    middleware::auth_context::AuthContext,
    models::{ApiOk, AppState, Notification, OkData},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(list_notifications))
        .route("/notifications/unread_count", get(unread_count))
        .route("/notifications/read_all", post(mark_all_read))
        .route("/notifications/{notification_id}/read", post(mark_read))
        .route("/notifications/{notification_id}", delete(delete_notification))
}

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub unread: i64,
}

#[derive(Debug, Serialize)]
pub struct MarkedCount {
    pub updated: u64,
}

pub async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<ApiOk<Vec<Notification>>>, ApiError> {
    let rows = state.adapter().list_notifications(&auth.tenant()).await?;
    Ok(Json(ApiOk { data: rows }))
}

pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Json<ApiOk<UnreadCount>> {
    let unread = state.adapter().unread_notification_count(&auth.tenant()).await;
    Json(ApiOk { data: UnreadCount { unread } })
}

pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(notification_id): Path<Uuid>,
) -> Result<Json<ApiOk<OkData>>, ApiError> {
    state
        .adapter()
        .mark_notification_read(&auth.tenant(), notification_id)
        .await?;
    Ok(Json(ApiOk { data: OkData { ok: true } }))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<ApiOk<MarkedCount>>, ApiError> {
    let updated = state.adapter().mark_all_notifications_read(&auth.tenant()).await?;
    Ok(Json(ApiOk { data: MarkedCount { updated } }))
}

pub async fn delete_notification(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(notification_id): Path<Uuid>,
) -> Result<Json<ApiOk<OkData>>, ApiError> {
    state
        .adapter()
        .delete_notification(&auth.tenant(), notification_id)
        .await?;
    Ok(Json(ApiOk { data: OkData { ok: true } }))
}
