//! Route definitions for the trenddash API.

pub mod analytics;
pub mod auth;
pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::AppState;

/// Assemble the full route tree. Protected routes gate themselves through the
/// `CurrentUser` extractor; everything else is public.
pub fn api_router() -> Router<AppState> {
    let auth_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me));

    let analytics_routes = Router::new()
        .route("/analytics/summary", get(analytics::summary))
        .route("/analytics/timeseries", get(analytics::timeseries));

    Router::new()
        .nest("/api/v1", auth_routes.merge(analytics_routes))
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
}
