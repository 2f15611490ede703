use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentTutor, CurrentUser};
use crate::api::validation::validate_with;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::EducationalResource;
use crate::repositories;
use crate::repositories::resources::CreateResource;
use crate::schemas::resource::{is_valid_file_url, ResourceCreate, ResourceResponse};

const LISTED_RESOURCES: i64 = 100;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/resources", get(list_resources).post(create_resource))
}

async fn list_resources(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> Result<Json<Vec<ResourceResponse>>, ApiError> {
    let resources = repositories::resources::list_active(state.db(), 0, LISTED_RESOURCES)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list resources"))?;

    Ok(Json(resources.into_iter().map(ResourceResponse::from_db).collect()))
}

/// Validates `payload` and stores it as a resource owned by `tutor_id`.
pub(crate) async fn insert_resource(
    state: &AppState,
    tutor_id: &str,
    payload: &ResourceCreate,
) -> Result<EducationalResource, ApiError> {
    let subject = repositories::catalog::find_subject(state.db(), payload.subject_id.trim())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load subject"))?;
    let file_url = payload.file_url.as_deref().map(str::trim).filter(|value| !value.is_empty());

    validate_with(payload, |errors| {
        if !subject.is_some_and(|subject| subject.active) {
            errors.add("subject_id", "Select a valid subject");
        }
        if file_url.is_some_and(|url| !is_valid_file_url(url)) {
            errors.add("file_url", "Enter a valid http(s) URL");
        }
    })?;

    let resource_id = Uuid::new_v4().to_string();
    repositories::resources::create(
        state.db(),
        CreateResource {
            id: &resource_id,
            tutor_id,
            subject_id: payload.subject_id.trim(),
            title: payload.title.trim(),
            description: payload.description.trim(),
            kind: payload.kind,
            file_url,
            content: &payload.content,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create resource"))
}

async fn create_resource(
    State(state): State<AppState>,
    current: CurrentTutor,
    Json(payload): Json<ResourceCreate>,
) -> Result<(StatusCode, Json<ResourceResponse>), ApiError> {
    let resource = insert_resource(&state, &current.tutor.id, &payload).await?;

    tracing::info!(
        user_id = %current.user.id,
        resource_id = %resource.id,
        action = "resource_created",
        "Educational resource created"
    );
    Ok((StatusCode::CREATED, Json(ResourceResponse::from_db(resource))))
}
