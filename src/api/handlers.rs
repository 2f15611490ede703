use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::collections::HashMap;

use crate::api::errors::ApiError;
use crate::core::metrics;
use crate::core::state::AppState;
use crate::db::types::TutoringStatus;
use crate::repositories;
use crate::schemas::home::HomeResponse;
use crate::schemas::tutor::TutorSummary;
use crate::schemas::HealthResponse;

const HOME_TOP_TUTORS: i64 = 6;

/// Landing data: best rated tutors and platform totals.
pub(crate) async fn root(State(state): State<AppState>) -> Result<Json<HomeResponse>, ApiError> {
    let top_tutors = repositories::tutors::top_rated(state.db(), HOME_TOP_TUTORS)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load top tutors"))?;
    let active_tutors = repositories::tutors::count_active(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count tutors"))?;
    let completed_sessions =
        repositories::tutoring_sessions::count_by_status(state.db(), TutoringStatus::Completed)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to count sessions"))?;

    Ok(Json(HomeResponse {
        top_tutors: top_tutors.into_iter().map(TutorSummary::from_db).collect(),
        active_tutors,
        completed_sessions,
    }))
}

pub(crate) async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    let mut status = "healthy".to_string();
    let mut components = HashMap::new();

    match state.redis().health().await {
        crate::core::redis::RedisHealth::Healthy => {
            components.insert("redis".to_string(), "healthy".to_string());
        }
        crate::core::redis::RedisHealth::Disconnected => {
            components.insert("redis".to_string(), "disconnected".to_string());
        }
        crate::core::redis::RedisHealth::Unhealthy(error) => {
            components.insert("redis".to_string(), format!("unhealthy: {error}"));
            status = "degraded".to_string();
        }
    }

    match repositories::health::catalog_seeded(state.db()).await {
        Ok(true) => {
            components.insert("database".to_string(), "healthy".to_string());
        }
        Ok(false) => {
            components.insert("database".to_string(), "missing catalog data".to_string());
            status = "degraded".to_string();
        }
        Err(err) => {
            components.insert("database".to_string(), format!("unhealthy: {err}"));
            status = "unhealthy".to_string();
        }
    }

    Json(HealthResponse { service: "tutorias-api".to_string(), status, components })
}

pub(crate) async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    if !state.settings().telemetry().prometheus_enabled {
        return StatusCode::NOT_FOUND.into_response();
    }

    match metrics::render() {
        Some(body) => ([(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
            .into_response(),
        None => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}
