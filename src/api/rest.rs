//! Paginated CRUD resources mounted under the API prefix. Every route needs
//! an authenticated session; `DELETE` never removes rows.

use axum::Router;

use crate::api::errors::ApiError;
use crate::api::guards::require_participant;
use crate::core::state::AppState;
use crate::db::models::{TutoringSession, User};
use crate::repositories;

mod messages;
mod resources;
mod sessions;
mod tutors;
mod users;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .nest("/messages", messages::router())
        .nest("/resources", resources::router())
        .nest("/sessions", sessions::router())
        .nest("/tutors", tutors::router())
        .nest("/users", users::router())
}

/// Participants see their sessions; staff see every session.
pub(crate) async fn visible_session(
    state: &AppState,
    user: &User,
    session_id: &str,
) -> Result<TutoringSession, ApiError> {
    if !user.is_admin() {
        return require_participant(state, user, session_id).await.map(|(session, _)| session);
    }

    repositories::tutoring_sessions::find_by_id(state.db(), session_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load session"))?
        .ok_or_else(|| ApiError::NotFound("Session not found".to_string()))
}

/// `None` lists everything, otherwise only rows the user takes part in.
pub(crate) fn participant_scope(user: &User) -> Option<&str> {
    (!user.is_admin()).then_some(user.id.as_str())
}

fn collection_path(state: &AppState, resource: &str) -> String {
    format!("{}/{resource}", state.settings().api().api_v1_str.trim_end_matches('/'))
}

#[cfg(test)]
mod tests;
