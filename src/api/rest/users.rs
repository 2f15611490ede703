use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::api::admin::apply_user_update;
use crate::api::auth::create_account;
use crate::api::errors::ApiError;
use crate::api::guards::{CurrentAdmin, CurrentUser};
use crate::api::pagination::{Page, PageQuery};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::user::{RegisterRequest, UserResponse, UserUpdate};

use super::collection_path;

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user).patch(update_user).delete(deactivate_user))
}

async fn list_users(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Query(page): Query<PageQuery>,
) -> Result<Json<Page<UserResponse>>, ApiError> {
    let page_size = state.settings().api().page_size;
    let count = repositories::users::count_all(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count users"))?;
    let users = repositories::users::list_page(state.db(), page.offset(page_size), page_size)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list users"))?;

    let results = users.into_iter().map(UserResponse::from_db).collect();
    Ok(Json(Page::new(results, count, &page, page_size, &collection_path(&state, "users"))))
}

async fn get_user(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = repositories::users::find_by_id(state.db(), &user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch user"))?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse::from_db(user)))
}

async fn create_user(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = create_account(&state, &payload).await?;
    tracing::info!(
        user_id = %admin.id,
        target_user_id = %user.id,
        action = "user_created",
        "Account created by staff"
    );
    Ok((StatusCode::CREATED, Json(UserResponse::from_db(user))))
}

async fn update_user(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    Path(user_id): Path<String>,
    Json(payload): Json<UserUpdate>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = apply_user_update(&state, &admin, &user_id, payload).await?;
    Ok(Json(UserResponse::from_db(user)))
}

async fn deactivate_user(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    Path(user_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let deactivated = repositories::users::deactivate(state.db(), &user_id, primitive_now_utc())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to deactivate user"))?;
    if !deactivated {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    tracing::info!(
        user_id = %admin.id,
        target_user_id = %user_id,
        action = "user_deactivated",
        "Account deactivated by staff"
    );
    Ok(StatusCode::NO_CONTENT)
}
