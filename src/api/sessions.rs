use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use sqlx::{Postgres, Transaction};

use crate::api::errors::ApiError;
use crate::api::guards::{require_participant, require_session_tutor, CurrentUser, Participant};
use crate::api::validation::validate_payload;
use crate::core::time::{format_local_datetime, primitive_now_utc};
use crate::core::{metrics, state::AppState};
use crate::db::models::{TutoringSession, User};
use crate::db::types::TutoringStatus;
use crate::repositories;
use crate::repositories::tutoring_sessions::{Order, SessionFilter, Transition};
use crate::schemas::message::MessageResponse;
use crate::schemas::session::{
    ActionResponse, DenyRequest, MySessionsResponse, RatingRequest, SessionDetailResponse,
    SessionOverviewResponse, SessionResponse, SessionRole,
};
use crate::services::{notifications, tutor_stats};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/my-sessions", get(my_sessions))
        .route("/sessions/:id", get(session_detail))
        .route("/sessions/:id/accept", post(accept_session))
        .route("/sessions/:id/deny", post(deny_session))
        .route("/sessions/:id/finish", post(finish_session))
        .route("/sessions/:id/cancel", post(cancel_session))
        .route("/sessions/:id/no-show", post(mark_no_show))
        .route("/sessions/:id/rating", post(rate_session))
}

async fn overviews(
    state: &AppState,
    filter: &SessionFilter<'_>,
    order: Order,
) -> Result<Vec<SessionOverviewResponse>, ApiError> {
    let rows = repositories::tutoring_sessions::list_overviews(state.db(), filter, order, None)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list sessions"))?;
    Ok(SessionOverviewResponse::from_rows(rows, state.local_offset()))
}

async fn my_sessions(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<MySessionsResponse>, ApiError> {
    let now = primitive_now_utc();
    let tutor = repositories::tutors::find_by_user_id(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load tutor profile"))?
        .filter(|_| user.is_tutor);

    let response = match tutor {
        Some(tutor) => {
            let tutor_id = Some(tutor.id.as_str());
            let pending = SessionFilter {
                tutor_id,
                statuses: &[TutoringStatus::Pending],
                ..SessionFilter::default()
            };
            let upcoming = SessionFilter {
                tutor_id,
                statuses: &[TutoringStatus::Accepted],
                scheduled_from: Some(now),
                ..SessionFilter::default()
            };
            let awaiting_rating = SessionFilter {
                tutor_id,
                statuses: &[TutoringStatus::Completed],
                student_rating_missing: true,
                ..SessionFilter::default()
            };
            MySessionsResponse::Tutor {
                pending: overviews(&state, &pending, Order::SoonestFirst).await?,
                upcoming: overviews(&state, &upcoming, Order::SoonestFirst).await?,
                awaiting_rating: overviews(&state, &awaiting_rating, Order::LatestFirst).await?,
            }
        }
        None => {
            let student_id = Some(user.id.as_str());
            let upcoming = SessionFilter {
                student_id,
                statuses: &[TutoringStatus::Accepted],
                scheduled_from: Some(now),
                ..SessionFilter::default()
            };
            let pending = SessionFilter {
                student_id,
                statuses: &[TutoringStatus::Pending],
                ..SessionFilter::default()
            };
            let past = SessionFilter {
                student_id,
                statuses: &[TutoringStatus::Completed, TutoringStatus::NoShow],
                ..SessionFilter::default()
            };
            MySessionsResponse::Student {
                upcoming: overviews(&state, &upcoming, Order::SoonestFirst).await?,
                pending: overviews(&state, &pending, Order::SoonestFirst).await?,
                past: overviews(&state, &past, Order::LatestFirst).await?,
            }
        }
    };

    Ok(Json(response))
}

async fn session_detail(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(session_id): Path<String>,
) -> Result<Json<SessionDetailResponse>, ApiError> {
    let (session, participant) = require_participant(&state, &user, &session_id).await?;
    let offset = state.local_offset();

    let overview = repositories::tutoring_sessions::find_overview(state.db(), &session_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load session"))?
        .ok_or_else(|| ApiError::NotFound("Session not found".to_string()))?;
    let messages = repositories::messages::list_for_session(state.db(), &session_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load messages"))?;

    let completed = session.status == TutoringStatus::Completed;
    let (role, can_rate_tutor, can_rate_student) = match participant {
        Participant::Student => {
            (SessionRole::Student, completed && session.tutor_rating.is_none(), false)
        }
        Participant::Tutor => {
            (SessionRole::Tutor, false, completed && session.student_rating.is_none())
        }
    };

    Ok(Json(SessionDetailResponse {
        session: SessionOverviewResponse::from_db(overview, offset),
        role,
        messages: messages
            .into_iter()
            .map(|message| MessageResponse::with_sender(message, offset))
            .collect(),
        can_rate_tutor,
        can_rate_student,
    }))
}

/// Applies a guarded status change; a session in any other status is a conflict.
async fn apply_transition(
    executor: impl sqlx::PgExecutor<'_>,
    transition: Transition<'_>,
) -> Result<TutoringSession, ApiError> {
    let to = transition.to;
    let updated = repositories::tutoring_sessions::transition(executor, transition)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to update session status"))?;
    updated.ok_or_else(|| {
        ApiError::Conflict(format!("Session cannot be moved to {} from its current status", to.as_str()))
    })
}

fn log_transition(user: &User, session: &TutoringSession, action: &'static str) {
    metrics::record_tutoring_transition(session.status.as_str());
    tracing::info!(
        user_id = %user.id,
        session_id = %session.id,
        status = session.status.as_str(),
        action,
        "Tutoring session updated"
    );
}

async fn notify(
    executor: impl sqlx::PgExecutor<'_>,
    user_id: &str,
    session_id: &str,
    draft: &notifications::Draft,
) -> Result<(), ApiError> {
    notifications::send(executor, user_id, Some(session_id), draft)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to send notification"))
}

async fn begin(state: &AppState) -> Result<Transaction<'static, Postgres>, ApiError> {
    state.db().begin().await.map_err(|e| ApiError::internal(e, "Failed to begin transaction"))
}

async fn commit(tx: Transaction<'_, Postgres>) -> Result<(), ApiError> {
    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit session"))
}

async fn accept_session(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(session_id): Path<String>,
) -> Result<Json<ActionResponse>, ApiError> {
    require_session_tutor(&state, &user, &session_id).await?;
    let offset = state.local_offset();

    let mut tx = begin(&state).await?;
    let session = apply_transition(
        &mut *tx,
        Transition {
            id: &session_id,
            from: &[TutoringStatus::Pending],
            to: TutoringStatus::Accepted,
            rejection_reason: None,
            ended_at: None,
        },
    )
    .await?;

    let when = format_local_datetime(session.scheduled_at, offset);
    let draft = notifications::session_accepted(&user.first_name, &when);
    notify(&mut *tx, &session.student_id, &session.id, &draft).await?;
    commit(tx).await?;
    log_transition(&user, &session, "session_accepted");

    Ok(Json(ActionResponse {
        detail: "Session accepted",
        session: SessionResponse::from_db(session, offset),
    }))
}

async fn deny_session(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(session_id): Path<String>,
    payload: Option<Json<DenyRequest>>,
) -> Result<Json<ActionResponse>, ApiError> {
    require_session_tutor(&state, &user, &session_id).await?;
    let payload = payload.map(|Json(payload)| payload).unwrap_or_default();
    let reason = payload.reason();

    let mut tx = begin(&state).await?;
    let session = apply_transition(
        &mut *tx,
        Transition {
            id: &session_id,
            from: &[TutoringStatus::Pending],
            to: TutoringStatus::Denied,
            rejection_reason: Some(reason),
            ended_at: None,
        },
    )
    .await?;

    let draft = notifications::session_denied(reason);
    notify(&mut *tx, &session.student_id, &session.id, &draft).await?;
    commit(tx).await?;
    log_transition(&user, &session, "session_denied");

    Ok(Json(ActionResponse {
        detail: "Session denied",
        session: SessionResponse::from_db(session, state.local_offset()),
    }))
}

async fn finish_session(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(session_id): Path<String>,
) -> Result<Json<ActionResponse>, ApiError> {
    let current = require_session_tutor(&state, &user, &session_id).await?;
    let offset = state.local_offset();

    let mut tx = begin(&state).await?;
    let session = apply_transition(
        &mut *tx,
        Transition {
            id: &session_id,
            from: &[TutoringStatus::Accepted],
            to: TutoringStatus::Completed,
            rejection_reason: None,
            ended_at: Some(primitive_now_utc()),
        },
    )
    .await?;

    tutor_stats::recompute_counters(&mut tx, &current.tutor_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to update tutor counters"))?;

    let when = format_local_datetime(session.scheduled_at, offset);
    let draft = notifications::session_finished(&user.first_name, &when);
    notify(&mut *tx, &session.student_id, &session.id, &draft).await?;
    commit(tx).await?;
    log_transition(&user, &session, "session_finished");

    Ok(Json(ActionResponse {
        detail: "Session finished",
        session: SessionResponse::from_db(session, offset),
    }))
}

async fn cancel_session(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(session_id): Path<String>,
) -> Result<Json<ActionResponse>, ApiError> {
    let (current, participant) = require_participant(&state, &user, &session_id).await?;
    let offset = state.local_offset();
    let recipient = match participant {
        Participant::Tutor => current.student_id,
        Participant::Student => {
            repositories::tutors::find_by_id(state.db(), &current.tutor_id)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to load tutor"))?
                .ok_or_else(|| ApiError::NotFound("Tutor not found".to_string()))?
                .user_id
        }
    };

    let mut tx = begin(&state).await?;
    let session = apply_transition(
        &mut *tx,
        Transition {
            id: &session_id,
            from: &[TutoringStatus::Pending, TutoringStatus::Accepted],
            to: TutoringStatus::Cancelled,
            rejection_reason: None,
            ended_at: None,
        },
    )
    .await?;

    let when = format_local_datetime(session.scheduled_at, offset);
    let draft = notifications::session_cancelled(&user.first_name, &when);
    notify(&mut *tx, &recipient, &session.id, &draft).await?;
    commit(tx).await?;
    log_transition(&user, &session, "session_cancelled");

    Ok(Json(ActionResponse {
        detail: "Session cancelled",
        session: SessionResponse::from_db(session, offset),
    }))
}

async fn mark_no_show(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(session_id): Path<String>,
) -> Result<Json<ActionResponse>, ApiError> {
    let current = require_session_tutor(&state, &user, &session_id).await?;
    if current.scheduled_at >= primitive_now_utc() {
        return Err(ApiError::BadRequest("The session has not started yet".to_string()));
    }

    let session = apply_transition(
        state.db(),
        Transition {
            id: &session_id,
            from: &[TutoringStatus::Accepted],
            to: TutoringStatus::NoShow,
            rejection_reason: None,
            ended_at: None,
        },
    )
    .await?;
    log_transition(&user, &session, "session_no_show");

    Ok(Json(ActionResponse {
        detail: "Session marked as no-show",
        session: SessionResponse::from_db(session, state.local_offset()),
    }))
}

async fn rate_session(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(session_id): Path<String>,
    Json(payload): Json<RatingRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    validate_payload(&payload)?;
    let (session, participant) = require_participant(&state, &user, &session_id).await?;
    if session.status != TutoringStatus::Completed {
        return Err(ApiError::BadRequest("Only completed sessions can be rated".to_string()));
    }

    let stored = match participant {
        Participant::Student => tutor_stats::record_tutor_rating(
            state.db(),
            &session.id,
            &session.tutor_id,
            payload.rating,
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to rate tutor"))?,
        Participant::Tutor => {
            repositories::tutoring_sessions::set_student_rating(state.db(), &session.id, payload.rating)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to rate student"))?
        }
    };
    if !stored {
        return Err(ApiError::Conflict("Session already rated".to_string()));
    }

    tracing::info!(
        user_id = %user.id,
        session_id = %session.id,
        rating = payload.rating,
        action = "session_rated",
        "Session rated"
    );

    let session = repositories::tutoring_sessions::find_by_id(state.db(), &session.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to reload session"))?
        .ok_or_else(|| ApiError::NotFound("Session not found".to_string()))?;

    Ok(Json(ActionResponse {
        detail: "Rating saved",
        session: SessionResponse::from_db(session, state.local_offset()),
    }))
}
