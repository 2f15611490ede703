use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::api::errors::ApiError;
use crate::api::session_layer::AuthContext;
use crate::core::state::AppState;
use crate::db::models::{Tutor, TutoringSession, User};
use crate::repositories;

pub(crate) struct CurrentUser(pub(crate) User);
pub(crate) struct CurrentAdmin(pub(crate) User);

/// Authenticated account that owns an active tutor profile.
pub(crate) struct CurrentTutor {
    pub(crate) user: User,
    pub(crate) tutor: Tutor,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(ApiError::Unauthorized("Authentication required"))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let context = AuthContext::from_request_parts(parts, state).await?;
        Ok(CurrentUser(context.user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        if user.is_admin() {
            Ok(CurrentAdmin(user))
        } else {
            Err(ApiError::Forbidden("Staff access required"))
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentTutor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        let tutor = repositories::tutors::find_by_user_id(state.db(), &user.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load tutor profile"))?;

        match tutor {
            Some(tutor) if user.is_tutor => Ok(CurrentTutor { user, tutor }),
            _ => Err(ApiError::Forbidden("Tutor profile required")),
        }
    }
}

/// Which side of a session the current user is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Participant {
    Tutor,
    Student,
}

/// Loads a session and the caller's role in it.
pub(crate) async fn require_participant(
    state: &AppState,
    user: &User,
    session_id: &str,
) -> Result<(TutoringSession, Participant), ApiError> {
    let session = repositories::tutoring_sessions::find_by_id(state.db(), session_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load session"))?
        .ok_or_else(|| ApiError::NotFound("Session not found".to_string()))?;

    if session.student_id == user.id {
        return Ok((session, Participant::Student));
    }

    let tutor = repositories::tutors::find_by_id(state.db(), &session.tutor_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load tutor"))?;
    if tutor.is_some_and(|tutor| tutor.user_id == user.id) {
        return Ok((session, Participant::Tutor));
    }

    Err(ApiError::Forbidden("Not a participant of this session"))
}

/// Like [`require_participant`] but only the session's tutor passes.
pub(crate) async fn require_session_tutor(
    state: &AppState,
    user: &User,
    session_id: &str,
) -> Result<TutoringSession, ApiError> {
    match require_participant(state, user, session_id).await? {
        (session, Participant::Tutor) => Ok(session),
        _ => Err(ApiError::Forbidden("Only the session tutor can do this")),
    }
}
