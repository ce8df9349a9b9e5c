use axum::{
    extract::{Path, Query, State},
    routing::{get, patch},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{
    adapter::CalendarQuery,
    error::ApiError,
    middleware::auth_context::AuthContext,
    models::{ApiOk, AppState},
    scheduling::calendar::{check_move, event_from_control, movable_control_id, CalendarEvent},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/calendar", get(get_calendar))
        .route("/calendar/events/{event_id}", patch(move_event))
}

pub async fn get_calendar(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(q): Query<CalendarQuery>,
) -> Result<Json<ApiOk<Vec<CalendarEvent>>>, ApiError> {
    let window = q.window(state.calendar_max_window_days)?;
    let events = state
        .adapter()
        .calendar_events(&auth.tenant(), window, q.status.as_deref(), &state.calendar)
        .await?;
    Ok(Json(ApiOk { data: events }))
}

#[derive(Debug, Deserialize)]
pub struct MoveEventRequest {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Drag-and-drop persistence. Only real controls can move; the end instant
/// is echoed back in the returned event's duration.
pub async fn move_event(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(event_id): Path<String>,
    Json(req): Json<MoveEventRequest>,
) -> Result<Json<ApiOk<CalendarEvent>>, ApiError> {
    check_move(req.start, req.end)?;
    let control_id = movable_control_id(&event_id)?;

    let control = state
        .adapter()
        .reschedule_appointment(&auth.tenant(), control_id, req.start)
        .await?;

    let mut event = event_from_control(&control, &state.calendar);
    event.end = req.end;
    Ok(Json(ApiOk { data: event }))
}
