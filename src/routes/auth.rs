//! Authentication routes: register, login, logout, profile.

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use validator::Validate;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::{CurrentUser, SESSION_COOKIE};
use crate::models::user::{Credentials, UserResponse};
use crate::services::auth as auth_service;
use crate::AppState;

/// Session cookie carrying the signed token. HTTP-only, path-scoped to the
/// whole site; the Secure flag follows deployment config (TLS).
fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .path("/")
        .secure(secure)
        .build()
}

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<Credentials>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), AppError> {
    body.validate()
        .map_err(|_| AppError::Validation("Username and password are required".to_string()))?;

    let user = auth_service::register(&state.db, &body).await?;
    Ok((StatusCode::CREATED, ApiResponse::success(user)))
}

/// POST /api/v1/auth/login — verify credentials and set the session cookie.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<Credentials>,
) -> Result<(CookieJar, Json<ApiResponse<&'static str>>), AppError> {
    body.validate()
        .map_err(|_| AppError::Validation("Username and password are required".to_string()))?;

    let user = auth_service::authenticate(&state.db, &body.username, &body.password).await?;
    let token = auth_service::issue_session_token(
        user.id,
        &state.config.jwt_secret,
        state.config.session_expiry_secs,
    )?;

    let jar = jar.add(session_cookie(token, state.config.cookie_secure));
    Ok((jar, ApiResponse::success("Login successful")))
}

/// POST /api/v1/auth/logout — clear the session cookie. Tokens are stateless,
/// so there is nothing to invalidate server-side.
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<ApiResponse<&'static str>>) {
    let removal = Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .path("/")
        .build();
    (jar.remove(removal), ApiResponse::success("Logged out successfully"))
}

/// GET /api/v1/auth/me — current user profile.
pub async fn me(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let user = auth_service::find_user_by_id(&state.db, current_user.id).await?;
    Ok(ApiResponse::success(UserResponse::from(user)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_attributes() {
        let cookie = session_cookie("tok".to_string(), false);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "tok");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.secure(), Some(false));
    }

    #[test]
    fn session_cookie_secure_flag_from_config() {
        let cookie = session_cookie("tok".to_string(), true);
        assert_eq!(cookie.secure(), Some(true));
    }
}
