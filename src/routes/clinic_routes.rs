// src/routes/clinic_routes.rs

use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::{
    adapter::ClinicInfo,
    error::ApiError,
    middleware::auth_context::AuthContext,
    models::{ApiOk, AppState},
};

const MAX_CLINIC_NAME: usize = 128;

pub fn router() -> Router<AppState> {
    Router::new().route("/clinic", get(get_clinic).patch(update_clinic))
}

pub async fn get_clinic(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<ApiOk<ClinicInfo>>, ApiError> {
    let clinic = state.adapter().get_clinic(&auth.tenant()).await?;
    Ok(Json(ApiOk { data: clinic }))
}

#[derive(Debug, Deserialize)]
pub struct UpdateClinicRequest {
    pub clinic_name: String,
}

pub async fn update_clinic(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<UpdateClinicRequest>,
) -> Result<Json<ApiOk<ClinicInfo>>, ApiError> {
    if req.clinic_name.trim().len() > MAX_CLINIC_NAME {
        return Err(ApiError::BadRequest(
            "VALIDATION_ERROR",
            format!("clinic_name is too long (max {MAX_CLINIC_NAME})"),
        ));
    }

    let clinic = state
        .adapter()
        .update_clinic_name(&auth.tenant(), &req.clinic_name)
        .await?;
    Ok(Json(ApiOk { data: clinic }))
}
