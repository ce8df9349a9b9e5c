// src/routes/patient_routes.rs

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    adapter::{CreatePatientInput, PatientOverview, UpdatePatientInput},
    error::ApiError,
    middleware::auth_context::AuthContext,
    models::{ApiOk, AppState, Patient},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/patients", get(search_patients).post(create_patient))
        .route("/patients/{patient_id}", get(get_patient).patch(update_patient))
        .route("/patients/{patient_id}/overview", get(get_patient_overview))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub limit: Option<i64>,
}

pub async fn search_patients(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(q): Query<SearchQuery>,
) -> Result<Json<ApiOk<Vec<Patient>>>, ApiError> {
    let rows = state
        .adapter()
        .list_patients(&auth.tenant(), q.q.as_deref(), q.limit)
        .await?;
    Ok(Json(ApiOk { data: rows }))
}

pub async fn create_patient(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<CreatePatientInput>,
) -> Result<Json<ApiOk<Patient>>, ApiError> {
    let row = state.adapter().create_patient(&auth.tenant(), req).await?;
    Ok(Json(ApiOk { data: row }))
}

pub async fn get_patient(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<ApiOk<Patient>>, ApiError> {
    let row = state.adapter().get_patient(&auth.tenant(), patient_id).await?;
    Ok(Json(ApiOk { data: row }))
}

pub async fn update_patient(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(patient_id): Path<Uuid>,
    Json(req): Json<UpdatePatientInput>,
) -> Result<Json<ApiOk<Patient>>, ApiError> {
    let row = state
        .adapter()
        .update_patient(&auth.tenant(), patient_id, req)
        .await?;
    Ok(Json(ApiOk { data: row }))
}

pub async fn get_patient_overview(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<ApiOk<PatientOverview>>, ApiError> {
    let overview = state
        .adapter()
        .patient_overview(&auth.tenant(), patient_id)
        .await?;
    Ok(Json(ApiOk { data: overview }))
}
