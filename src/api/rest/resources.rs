use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentTutor, CurrentUser};
use crate::api::pagination::{Page, PageQuery};
use crate::api::resources::insert_resource;
use crate::api::validation::validate_with;
use crate::core::state::AppState;
use crate::db::models::{EducationalResource, User};
use crate::repositories;
use crate::repositories::resources::UpdateResource;
use crate::schemas::resource::{is_valid_file_url, ResourceCreate, ResourceResponse, ResourceUpdate};

use super::collection_path;

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_resources).post(create_resource))
        .route("/:id", get(get_resource).patch(update_resource).delete(delete_resource))
}

async fn list_resources(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Query(page): Query<PageQuery>,
) -> Result<Json<Page<ResourceResponse>>, ApiError> {
    let page_size = state.settings().api().page_size;
    let count = repositories::resources::count_active(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count resources"))?;
    let resources =
        repositories::resources::list_active(state.db(), page.offset(page_size), page_size)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list resources"))?;

    let results = resources.into_iter().map(ResourceResponse::from_db).collect();
    Ok(Json(Page::new(results, count, &page, page_size, &collection_path(&state, "resources"))))
}

async fn load_resource(state: &AppState, id: &str) -> Result<EducationalResource, ApiError> {
    repositories::resources::find_by_id(state.db(), id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch resource"))?
        .ok_or_else(|| ApiError::NotFound("Resource not found".to_string()))
}

async fn get_resource(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(resource_id): Path<String>,
) -> Result<Json<ResourceResponse>, ApiError> {
    let resource = load_resource(&state, &resource_id).await?;
    Ok(Json(ResourceResponse::from_db(resource)))
}

async fn create_resource(
    State(state): State<AppState>,
    current: CurrentTutor,
    Json(payload): Json<ResourceCreate>,
) -> Result<(StatusCode, Json<ResourceResponse>), ApiError> {
    let resource = insert_resource(&state, &current.tutor.id, &payload).await?;
    Ok((StatusCode::CREATED, Json(ResourceResponse::from_db(resource))))
}

/// Owners edit their own resources; staff edit any.
async fn require_owner(
    state: &AppState,
    user: &User,
    resource: &EducationalResource,
) -> Result<(), ApiError> {
    if user.is_admin() {
        return Ok(());
    }
    let tutor = repositories::tutors::find_by_user_id(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load tutor profile"))?;
    match tutor {
        Some(tutor) if tutor.id == resource.tutor_id => Ok(()),
        _ => Err(ApiError::Forbidden("Only the owner can change this resource")),
    }
}

async fn update_resource(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(resource_id): Path<String>,
    Json(payload): Json<ResourceUpdate>,
) -> Result<Json<ResourceResponse>, ApiError> {
    let resource = load_resource(&state, &resource_id).await?;
    require_owner(&state, &user, &resource).await?;

    let subject_ok = match payload.subject_id.as_deref() {
        Some(subject_id) => repositories::catalog::find_subject(state.db(), subject_id.trim())
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load subject"))?
            .is_some_and(|subject| subject.active),
        None => true,
    };
    validate_with(&payload, |errors| {
        if !subject_ok {
            errors.add("subject_id", "Select a valid subject");
        }
        if let Some(url) = payload.file_url.as_deref().map(str::trim) {
            if !url.is_empty() && !is_valid_file_url(url) {
                errors.add("file_url", "Enter a valid http(s) URL");
            }
        }
    })?;

    let resource = repositories::resources::update(
        state.db(),
        &resource_id,
        UpdateResource {
            subject_id: payload.subject_id.map(|value| value.trim().to_string()),
            title: payload.title.map(|value| value.trim().to_string()),
            description: payload.description,
            kind: payload.kind,
            file_url: payload.file_url.map(|value| value.trim().to_string()),
            content: payload.content,
            active: payload.active,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update resource"))?
    .ok_or_else(|| ApiError::NotFound("Resource not found".to_string()))?;

    Ok(Json(ResourceResponse::from_db(resource)))
}

async fn delete_resource(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(resource_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let resource = load_resource(&state, &resource_id).await?;
    require_owner(&state, &user, &resource).await?;

    repositories::resources::update(
        state.db(),
        &resource_id,
        UpdateResource { active: Some(false), ..UpdateResource::default() },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to deactivate resource"))?;

    tracing::info!(
        user_id = %user.id,
        resource_id = %resource_id,
        action = "resource_deactivated",
        "Educational resource deactivated"
    );
    Ok(StatusCode::NO_CONTENT)
}
