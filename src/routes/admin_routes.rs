// src/routes/admin_routes.rs

use axum::{
    extract::{Path, State},
    routing::{get, patch},
    Json, Router,
};
use uuid::Uuid;

use crate::{
    adapter::{RoleUpdate, SystemStats},
    error::ApiError,
    middleware::auth_context::AuthContext,
    models::{ApiOk, AppState, Profile},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/stats", get(system_stats))
        .route("/admin/profiles", get(list_profiles))
        .route("/admin/profiles/{profile_id}", patch(update_profile_role))
}

pub async fn system_stats(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<ApiOk<SystemStats>>, ApiError> {
    let stats = state.adapter().system_stats(&auth.tenant()).await?;
    Ok(Json(ApiOk { data: stats }))
}

pub async fn list_profiles(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<ApiOk<Vec<Profile>>>, ApiError> {
    let rows = state.adapter().list_profiles(&auth.tenant()).await?;
    Ok(Json(ApiOk { data: rows }))
}

pub async fn update_profile_role(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(profile_id): Path<Uuid>,
    Json(req): Json<RoleUpdate>,
) -> Result<Json<ApiOk<Profile>>, ApiError> {
    let row = state
        .adapter()
        .update_profile_role(&auth.tenant(), profile_id, req)
        .await?;
    Ok(Json(ApiOk { data: row }))
}
