use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{require_participant, CurrentUser};
use crate::api::validation::validate_with;
use crate::core::state::AppState;
use crate::core::time::{format_local_clock, primitive_now_utc};
use crate::db::models::{Message, User};
use crate::repositories;
use crate::schemas::message::{ChatMessageRequest, ChatPostResponse, ChatResponse, MessageResponse};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/chat/:session_id", get(chat_history))
        .route("/chat/:session_id/messages", post(post_message))
}

async fn chat_history(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(session_id): Path<String>,
) -> Result<Json<ChatResponse>, ApiError> {
    require_participant(&state, &user, &session_id).await?;
    let offset = state.local_offset();

    let messages = repositories::messages::list_for_session(state.db(), &session_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load messages"))?;

    Ok(Json(ChatResponse {
        session_id,
        messages: messages
            .into_iter()
            .map(|message| MessageResponse::with_sender(message, offset))
            .collect(),
    }))
}

/// Stores a chat line from `sender`. Content is trimmed and must not be empty.
pub(crate) async fn store_message(
    state: &AppState,
    sender: &User,
    session_id: &str,
    payload: &ChatMessageRequest,
) -> Result<Message, ApiError> {
    let content = payload.content.trim();
    validate_with(payload, |errors| {
        if content.is_empty() {
            errors.add("content", "Message must not be empty");
        }
    })?;

    let message_id = Uuid::new_v4().to_string();
    let message = repositories::messages::create(
        state.db(),
        &message_id,
        session_id,
        &sender.id,
        content,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to store message"))?;

    tracing::debug!(
        user_id = %sender.id,
        session_id = %session_id,
        message_id = %message.id,
        "Chat message stored"
    );
    Ok(message)
}

async fn post_message(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(session_id): Path<String>,
    Json(payload): Json<ChatMessageRequest>,
) -> Result<(StatusCode, Json<ChatPostResponse>), ApiError> {
    require_participant(&state, &user, &session_id).await?;
    let message = store_message(&state, &user, &session_id, &payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ChatPostResponse {
            time: format_local_clock(message.sent_at, state.local_offset()),
            id: message.id,
            sender: user.full_name(),
            content: message.body,
        }),
    ))
}

#[cfg(test)]
mod tests;
