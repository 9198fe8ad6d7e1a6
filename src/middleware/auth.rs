//! Session-cookie authentication extractor for Axum handlers.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use crate::errors::AppError;
use crate::services::auth as auth_service;
use crate::AppState;

/// Name of the session cookie issued at login.
pub const SESSION_COOKIE: &str = "session";

/// Authenticated user extracted from the session cookie.
///
/// Use as an Axum extractor in handlers that require authentication:
/// ```ignore
/// async fn handler(current_user: CurrentUser) -> impl IntoResponse { ... }
/// ```
/// A missing, malformed, expired, or forged token rejects the request before
/// the handler runs.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::Unauthorized)?;

        let token = jar
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_owned())
            .ok_or(AppError::Unauthorized)?;

        let claims = auth_service::validate_session_token(&token, &state.config.jwt_secret)?;

        let user_id: Uuid = claims.sub.parse().map_err(|_| AppError::Unauthorized)?;

        Ok(CurrentUser { id: user_id })
    }
}
