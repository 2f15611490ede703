use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::api::chat::store_message;
use crate::api::errors::ApiError;
use crate::api::guards::{require_participant, CurrentUser};
use crate::api::pagination::{Page, PageQuery};
use crate::api::validation::validate_with;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::message::{ChatMessageRequest, MessageCreate, MessageResponse, MessageUpdate};

use super::{collection_path, participant_scope, visible_session};

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_messages).post(create_message))
        .route("/:id", get(get_message).patch(update_message))
}

async fn list_messages(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(page): Query<PageQuery>,
) -> Result<Json<Page<MessageResponse>>, ApiError> {
    let page_size = state.settings().api().page_size;
    let scope = participant_scope(&user);

    let count = repositories::messages::count_for_participant(state.db(), scope)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count messages"))?;
    let messages = repositories::messages::list_page_for_participant(
        state.db(),
        scope,
        page.offset(page_size),
        page_size,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to list messages"))?;

    let offset = state.local_offset();
    let results =
        messages.into_iter().map(|message| MessageResponse::from_db(message, offset)).collect();
    Ok(Json(Page::new(results, count, &page, page_size, &collection_path(&state, "messages"))))
}

async fn get_message(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(message_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let message = repositories::messages::find_by_id(state.db(), &message_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch message"))?
        .ok_or_else(|| ApiError::NotFound("Message not found".to_string()))?;
    visible_session(&state, &user, &message.session_id).await?;

    Ok(Json(MessageResponse::from_db(message, state.local_offset())))
}

async fn create_message(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<MessageCreate>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    // Staff may read any conversation but only participants write to it.
    require_participant(&state, &user, &payload.session_id).await?;
    let message = store_message(
        &state,
        &user,
        &payload.session_id,
        &ChatMessageRequest { content: payload.content },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(MessageResponse::from_db(message, state.local_offset()))))
}

async fn update_message(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(message_id): Path<String>,
    Json(payload): Json<MessageUpdate>,
) -> Result<Json<MessageResponse>, ApiError> {
    let message = repositories::messages::find_by_id(state.db(), &message_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch message"))?
        .ok_or_else(|| ApiError::NotFound("Message not found".to_string()))?;
    if message.sender_id != user.id && !user.is_admin() {
        return Err(ApiError::Forbidden("Only the sender can edit a message"));
    }

    let content = payload.content.trim();
    validate_with(&payload, |errors| {
        if content.is_empty() {
            errors.add("content", "Message must not be empty");
        }
    })?;

    let message = repositories::messages::update_body(state.db(), &message_id, content)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to update message"))?
        .ok_or_else(|| ApiError::NotFound("Message not found".to_string()))?;

    Ok(Json(MessageResponse::from_db(message, state.local_offset())))
}
