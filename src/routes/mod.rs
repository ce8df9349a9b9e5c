use crate::models::AppState;
use axum::Router;

pub mod admin_routes;
pub mod calendar_routes;
pub mod clinic_routes;
pub mod control_routes;
pub mod home_routes;
pub mod notification_routes;
pub mod patient_routes;
pub mod report_routes;
pub mod schedule_routes;

pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", home_routes::router())
        .nest("/api/v1", control_routes::router())
        .nest("/api/v1", schedule_routes::router())
        .nest("/api/v1", calendar_routes::router())
        .nest("/api/v1", report_routes::router())
        .nest("/api/v1", patient_routes::router())
        .nest("/api/v1", notification_routes::router())
        .nest("/api/v1", clinic_routes::router())
        .nest("/api/v1", admin_routes::router())
        .with_state(state)
}
