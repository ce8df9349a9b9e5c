use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use uuid::Uuid;

use crate::auth::hash_access_token;
use crate::error::ApiError;
use crate::models::AppState;
use crate::tenant::{Role, TenantContext};

#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub role: Role,
    pub session_token_id: Uuid,
}

impl AuthContext {
    /// The signed-in profile owns the clinic it acts for.
    pub fn tenant(&self) -> TenantContext {
        TenantContext::new(self.user_id, self.role)
    }
}

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = ApiError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        async move {
            // Extract Authorization: Bearer <token>
            let TypedHeader(authz): TypedHeader<Authorization<Bearer>> =
                TypedHeader::from_request_parts(parts, state)
                    .await
                    .map_err(|_| ApiError::session_expired())?;

            let token_hash = hash_access_token(authz.token());

            let principal = state
                .store
                .find_session(&token_hash)
                .await
                .map_err(|e| ApiError::Internal(e.message))?
                .ok_or_else(ApiError::session_expired)?;

            let role = Role::parse(&principal.role).ok_or_else(|| {
                tracing::warn!(user_id = %principal.user_id, role = %principal.role, "session has unknown role");
                ApiError::Forbidden("FORBIDDEN", "Account has no clinic role".into())
            })?;

            Ok(AuthContext {
                user_id: principal.user_id,
                role,
                session_token_id: principal.session_token_id,
            })
        }
    }
}
