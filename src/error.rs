use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::store::StoreError;

/* -------------------------
   Domain errors
--------------------------*/

#[derive(Debug, Error)]
pub enum SchedulingError {
    /// Rejected before any store call was made.
    #[error("validation error: {0}")]
    Validation(String),

    /// The store rejected a read or write; message is the store's own.
    #[error("{0}")]
    Persistence(String),

    /// The primary row was written but a linked row (e.g. the ledger cost of
    /// a control) was not.
    #[error("control {control_id} saved but linked cost failed: {message}")]
    ConsistencyGap { control_id: Uuid, message: String },

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Forbidden(String),
}

impl SchedulingError {
    pub fn validation(msg: impl Into<String>) -> Self {
        SchedulingError::Validation(msg.into())
    }
}

impl From<StoreError> for SchedulingError {
    fn from(e: StoreError) -> Self {
        SchedulingError::Persistence(e.message)
    }
}

pub type SchedulingResult<T> = Result<T, SchedulingError>;

/* -------------------------
   HTTP errors
--------------------------*/

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorObject,
}

#[derive(Debug, Serialize)]
pub struct ErrorObject {
    pub code: String,
    pub message: String,
}

#[derive(Debug)]
pub enum ApiError {
    Unauthorized(&'static str, String),
    Forbidden(&'static str, String),
    BadRequest(&'static str, String),
    NotFound(&'static str, String),
    Conflict(&'static str, String),
    Internal(String),
}

impl ApiError {
    pub fn session_expired() -> Self {
        ApiError::Unauthorized("SESSION_EXPIRED", "Session expired".into())
    }

    fn to_error_response(code: &str, message: &str) -> Json<ErrorResponse> {
        Json(ErrorResponse {
            error: ErrorObject {
                code: code.to_string(),
                message: message.to_string(),
            },
        })
    }
}

impl From<SchedulingError> for ApiError {
    fn from(e: SchedulingError) -> Self {
        match e {
            SchedulingError::Validation(msg) => ApiError::BadRequest("VALIDATION_ERROR", msg),
            SchedulingError::Persistence(msg) => ApiError::Internal(msg),
            gap @ SchedulingError::ConsistencyGap { .. } => {
                ApiError::Conflict("CONSISTENCY_GAP", gap.to_string())
            }
            SchedulingError::NotFound(what) => {
                ApiError::NotFound("NOT_FOUND", format!("{what} not found"))
            }
            SchedulingError::Forbidden(msg) => ApiError::Forbidden("FORBIDDEN", msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized(code, msg) => {
                (StatusCode::UNAUTHORIZED, ApiError::to_error_response(code, &msg)).into_response()
            }
            ApiError::Forbidden(code, msg) => {
                (StatusCode::FORBIDDEN, ApiError::to_error_response(code, &msg)).into_response()
            }
            ApiError::BadRequest(code, msg) => {
                (StatusCode::BAD_REQUEST, ApiError::to_error_response(code, &msg)).into_response()
            }
            ApiError::NotFound(code, msg) => {
                (StatusCode::NOT_FOUND, ApiError::to_error_response(code, &msg)).into_response()
            }
            ApiError::Conflict(code, msg) => {
                (StatusCode::CONFLICT, ApiError::to_error_response(code, &msg)).into_response()
            }
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::to_error_response("INTERNAL", &msg),
            )
                .into_response(),
        }
    }
}
