use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentAdmin;
use crate::core::state::AppState;
use crate::services::external_api::JSONPLACEHOLDER_ENDPOINTS;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/proxy/countries", get(countries))
        .route("/proxy/jsonplaceholder/:endpoint", get(jsonplaceholder))
}

fn upstream_failure(err: anyhow::Error) -> Response {
    tracing::warn!(error = %format!("{err:#}"), "External API request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": format!("{err:#}") }))).into_response()
}

async fn countries(State(state): State<AppState>, CurrentAdmin(_admin): CurrentAdmin) -> Response {
    match state.external_api().countries().await {
        Ok(body) => Json(body).into_response(),
        Err(err) => upstream_failure(err),
    }
}

async fn jsonplaceholder(
    State(state): State<AppState>,
    CurrentAdmin(_admin): CurrentAdmin,
    Path(endpoint): Path<String>,
) -> Result<Response, ApiError> {
    if !JSONPLACEHOLDER_ENDPOINTS.contains(&endpoint.as_str()) {
        return Err(ApiError::BadRequest(format!("Unsupported endpoint '{endpoint}'")));
    }

    Ok(match state.external_api().jsonplaceholder(&endpoint).await {
        Ok(body) => Json(body).into_response(),
        Err(err) => upstream_failure(err),
    })
}
