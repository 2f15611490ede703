use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::notification::{NotificationListResponse, NotificationResponse};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(list_notifications))
        .route("/notifications/:id/read", post(mark_read))
}

async fn list_notifications(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<NotificationListResponse>, ApiError> {
    let notifications = repositories::notifications::list_for_user(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list notifications"))?;
    let unread = notifications.iter().filter(|notification| !notification.read).count() as i64;

    Ok(Json(NotificationListResponse {
        unread,
        notifications: notifications.into_iter().map(NotificationResponse::from_db).collect(),
    }))
}

async fn mark_read(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(notification_id): Path<String>,
) -> Result<Json<NotificationResponse>, ApiError> {
    let notification =
        repositories::notifications::mark_read(state.db(), &notification_id, &user.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to update notification"))?
            .ok_or_else(|| ApiError::NotFound("Notification not found".to_string()))?;

    Ok(Json(NotificationResponse::from_db(notification)))
}
