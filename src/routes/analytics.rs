//! Analytics routes: aggregate summary and per-day timeseries.

use axum::{
    extract::{Query, State},
    Json,
};

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::models::analytics::{
    FeatureTotals, SummaryParams, TimeseriesParams, TimeseriesResponse,
};
use crate::services::analytics as analytics_service;
use crate::AppState;

/// GET /api/v1/analytics/summary — totals for all six measures over the
/// filtered rows.
pub async fn summary(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(params): Query<SummaryParams>,
) -> Result<Json<ApiResponse<FeatureTotals>>, AppError> {
    let filters = params.into_filters()?;
    let totals = analytics_service::summary(&state.db, &filters).await?;
    Ok(ApiResponse::success(totals))
}

/// GET /api/v1/analytics/timeseries — per-day sums for one measure.
///
/// The feature parameter is resolved against the allow-list before anything
/// touches the store; a missing or unknown feature never issues a query.
pub async fn timeseries(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(params): Query<TimeseriesParams>,
) -> Result<Json<ApiResponse<TimeseriesResponse>>, AppError> {
    let feature = params.feature()?;
    let filters = params.into_filters()?;
    let data = analytics_service::timeseries(&state.db, feature, &filters).await?;
    Ok(ApiResponse::success(TimeseriesResponse { feature, data }))
}
