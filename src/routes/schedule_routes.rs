use axum::{
    extract::{Path, Query, State},
    routing::{get, patch},
    Json, Router,
};
use uuid::Uuid;

use crate::{
    adapter::{CreateScheduleInput, ScheduleFilter, UpdateScheduleInput},
    error::ApiError,
    middleware::auth_context::AuthContext,
    models::{ApiOk, AppState, ControlSchedule},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/schedules", get(list_schedules).post(create_schedule))
        .route("/schedules/{schedule_id}", patch(update_schedule).get(get_schedule))
}

pub async fn list_schedules(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(filter): Query<ScheduleFilter>,
) -> Result<Json<ApiOk<Vec<ControlSchedule>>>, ApiError> {
    let rows = state.adapter().list_schedules(&auth.tenant(), &filter).await?;
    Ok(Json(ApiOk { data: rows }))
}

pub async fn get_schedule(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(schedule_id): Path<Uuid>,
) -> Result<Json<ApiOk<ControlSchedule>>, ApiError> {
    let row = state.adapter().get_schedule(&auth.tenant(), schedule_id).await?;
    Ok(Json(ApiOk { data: row }))
}

pub async fn create_schedule(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<CreateScheduleInput>,
) -> Result<Json<ApiOk<ControlSchedule>>, ApiError> {
    let row = state.adapter().create_schedule(&auth.tenant(), req).await?;
    Ok(Json(ApiOk { data: row }))
}

pub async fn update_schedule(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(schedule_id): Path<Uuid>,
    Json(req): Json<UpdateScheduleInput>,
) -> Result<Json<ApiOk<ControlSchedule>>, ApiError> {
    let row = state
        .adapter()
        .update_schedule(&auth.tenant(), schedule_id, req)
        .await?;
    Ok(Json(ApiOk { data: row }))
}
