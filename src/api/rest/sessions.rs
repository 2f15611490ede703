use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{require_session_tutor, CurrentUser};
use crate::api::pagination::{Page, PageQuery};
use crate::api::validation::validate_with;
use crate::core::time::{primitive_now_utc, to_primitive_utc};
use crate::core::{metrics, state::AppState};
use crate::db::types::TutoringStatus;
use crate::repositories;
use crate::repositories::tutoring_sessions::{CreateSession, Transition};
use crate::schemas::message::MessageResponse;
use crate::schemas::session::{SessionCreate, SessionResponse, SessionUpdate, SessionWithMessages};

use super::{collection_path, participant_scope, visible_session};

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sessions).post(create_session))
        .route("/:id", get(get_session).patch(update_session).delete(cancel_session))
}

async fn list_sessions(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(page): Query<PageQuery>,
) -> Result<Json<Page<SessionResponse>>, ApiError> {
    let page_size = state.settings().api().page_size;
    let scope = participant_scope(&user);

    let count = repositories::tutoring_sessions::count_for_participant(state.db(), scope)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count sessions"))?;
    let sessions = repositories::tutoring_sessions::list_page_for_participant(
        state.db(),
        scope,
        page.offset(page_size),
        page_size,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to list sessions"))?;

    let offset = state.local_offset();
    let results = sessions.into_iter().map(|session| SessionResponse::from_db(session, offset)).collect();
    Ok(Json(Page::new(results, count, &page, page_size, &collection_path(&state, "sessions"))))
}

async fn get_session(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(session_id): Path<String>,
) -> Result<Json<SessionWithMessages>, ApiError> {
    let session = visible_session(&state, &user, &session_id).await?;
    let messages = repositories::messages::list_for_session(state.db(), &session_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load messages"))?;

    let offset = state.local_offset();
    Ok(Json(SessionWithMessages {
        session: SessionResponse::from_db(session, offset),
        messages: messages
            .into_iter()
            .map(|message| MessageResponse::with_sender(message, offset))
            .collect(),
    }))
}

/// Books directly at a timestamp; the caller is the student.
async fn create_session(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<SessionCreate>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let tutor = repositories::tutors::find_by_id(state.db(), payload.tutor_id.trim())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load tutor"))?;
    let subject = repositories::catalog::find_subject(state.db(), payload.subject_id.trim())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load subject"))?;
    let scheduled_at = to_primitive_utc(payload.scheduled_at);
    let now = primitive_now_utc();

    validate_with(&payload, |errors| {
        match &tutor {
            Some(tutor) if tutor.active && tutor.user_id != user.id => {}
            Some(tutor) if tutor.user_id == user.id => {
                errors.add("tutor_id", "You cannot book a session with yourself")
            }
            _ => errors.add("tutor_id", "Select an active tutor"),
        }
        if !subject.is_some_and(|subject| subject.active) {
            errors.add("subject_id", "Select a valid subject");
        }
        if scheduled_at <= now {
            errors.add("scheduled_at", "The session must be scheduled in the future");
        }
    })?;

    let session_id = Uuid::new_v4().to_string();
    let session = repositories::tutoring_sessions::create(
        state.db(),
        CreateSession {
            id: &session_id,
            tutor_id: payload.tutor_id.trim(),
            student_id: &user.id,
            subject_id: payload.subject_id.trim(),
            modality: payload.modality,
            scheduled_at,
            duration_minutes: payload.duration_minutes,
            topic: payload.topic.trim(),
            created_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create session"))?;

    metrics::record_tutoring_transition(TutoringStatus::Pending.as_str());
    tracing::info!(
        user_id = %user.id,
        session_id = %session.id,
        action = "session_booked",
        "Tutoring session created"
    );
    Ok((StatusCode::CREATED, Json(SessionResponse::from_db(session, state.local_offset()))))
}

async fn update_session(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(session_id): Path<String>,
    Json(payload): Json<SessionUpdate>,
) -> Result<Json<SessionResponse>, ApiError> {
    visible_session(&state, &user, &session_id).await?;
    if payload.tutor_notes.is_some() && !user.is_admin() {
        require_session_tutor(&state, &user, &session_id).await?;
    }
    validate_with(&payload, |_| {})?;

    let session = repositories::tutoring_sessions::update_details(
        state.db(),
        &session_id,
        payload.topic.as_deref().map(str::trim),
        payload.tutor_notes.as_deref(),
        payload.modality,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update session"))?
    .ok_or_else(|| ApiError::NotFound("Session not found".to_string()))?;

    Ok(Json(SessionResponse::from_db(session, state.local_offset())))
}

async fn cancel_session(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    visible_session(&state, &user, &session_id).await?;

    let cancelled = repositories::tutoring_sessions::transition(
        state.db(),
        Transition {
            id: &session_id,
            from: &[TutoringStatus::Pending, TutoringStatus::Accepted],
            to: TutoringStatus::Cancelled,
            rejection_reason: None,
            ended_at: None,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to cancel session"))?;
    if cancelled.is_none() {
        return Err(ApiError::Conflict("Only pending or accepted sessions can be cancelled".to_string()));
    }

    metrics::record_tutoring_transition(TutoringStatus::Cancelled.as_str());
    tracing::info!(
        user_id = %user.id,
        session_id = %session_id,
        action = "session_cancelled",
        "Tutoring session cancelled"
    );
    Ok(StatusCode::NO_CONTENT)
}
