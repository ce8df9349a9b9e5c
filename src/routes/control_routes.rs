// src/routes/control_routes.rs

use axum::{
    extract::{Path, Query, State},
    routing::{get, patch},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    adapter::{AppointmentFilter, ControlCategory, CreateControlInput, StatusUpdate},
    error::ApiError,
    middleware::auth_context::AuthContext,
    models::{ApiOk, AppState, Control},
    scheduling::status::ControlStatus,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/controls", get(list_controls).post(create_control))
        .route("/controls/{control_id}", get(get_control))
        .route("/controls/{control_id}/status", patch(update_control_status))
}

/* ============================================================
   Query params
   ============================================================ */

#[derive(Debug, Deserialize)]
pub struct ControlListQuery {
    pub patient_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub status: Option<String>,
    #[serde(default)]
    pub category: ControlCategory,
}

/* ============================================================
   GET /controls
   ============================================================ */

pub async fn list_controls(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(q): Query<ControlListQuery>,
) -> Result<Json<ApiOk<Vec<Control>>>, ApiError> {
    if let (Some(from), Some(to)) = (q.from, q.to) {
        if to <= from {
            return Err(ApiError::BadRequest(
                "VALIDATION_ERROR",
                "to must be after from".into(),
            ));
        }
    }

    let filter = AppointmentFilter {
        patient_id: q.patient_id,
        from: q.from,
        to: q.to,
        status: q.status,
        category: q.category,
    };
    let rows = state
        .adapter()
        .list_appointments(&auth.tenant(), &filter, Utc::now())
        .await?;
    Ok(Json(ApiOk { data: rows }))
}

/* ============================================================
   GET /controls/{id}
   ============================================================ */

pub async fn get_control(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(control_id): Path<Uuid>,
) -> Result<Json<ApiOk<Control>>, ApiError> {
    let row = state.adapter().get_appointment(&auth.tenant(), control_id).await?;
    Ok(Json(ApiOk { data: row }))
}

/* ============================================================
   POST /controls
   ============================================================ */

pub async fn create_control(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<CreateControlInput>,
) -> Result<Json<ApiOk<Control>>, ApiError> {
    let row = state.adapter().create_appointment(&auth.tenant(), req).await?;
    Ok(Json(ApiOk { data: row }))
}

/* ============================================================
   PATCH /controls/{id}/status
   ============================================================ */

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
    pub cost_cents: Option<i64>,
}

pub async fn update_control_status(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(control_id): Path<Uuid>,
    Json(req): Json<StatusUpdateRequest>,
) -> Result<Json<ApiOk<Control>>, ApiError> {
    let update = StatusUpdate {
        status: req.status.parse::<ControlStatus>()?,
        cost_cents: req.cost_cents,
    };
    let row = state
        .adapter()
        .update_appointment_status(&auth.tenant(), control_id, update)
        .await?;
    Ok(Json(ApiOk { data: row }))
}
