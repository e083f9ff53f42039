use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::{
    api::{app_state::AppState, dto::activity_dto::*},
    error::AppError,
    services::activity::require_records,
};

/// Header reporting whether a read was served from the cache
pub const CACHE_STATUS_HEADER: &str = "x-cache";

pub async fn log_activity(
    State(state): State<AppState>,
    Json(request): Json<LogActivityRequest>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Logging activity for user {} on {}", request.user_id, request.date);

    let record: ActivityResponse = state.activity_service.log_activity(request.into()).await?;

    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn get_activity_logs(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<ActivityRangeParams>,
) -> Result<Response, AppError> {
    let (start, end) = params.bounds();
    debug!("Getting activity logs: user={}, start={:?}, end={:?}", user_id, start, end);

    let lookup = state
        .activity_service
        .get_activity_logs(&user_id, start, end)
        .await?;

    let cache_status = if lookup.is_cache_hit() {
        CacheStatus::Hit
    } else {
        CacheStatus::Miss
    };
    let records: Vec<ActivityResponse> = require_records(lookup)?;

    let mut response = Json(records).into_response();
    response.headers_mut().insert(
        CACHE_STATUS_HEADER,
        HeaderValue::from_static(cache_status.as_str()),
    );
    Ok(response)
}
