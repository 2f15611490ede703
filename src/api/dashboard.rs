use axum::{extract::State, routing::get, Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::TutoringStatus;
use crate::repositories;
use crate::repositories::tutoring_sessions::{Order, SessionFilter};
use crate::schemas::home::{CatalogResponse, DashboardResponse};
use crate::schemas::session::SessionOverviewResponse;
use crate::schemas::tutor::TutorSummary;
use crate::services::rank::rank_for;

const UPCOMING_LIMIT: i64 = 5;
const TOP_TUTORS_LIMIT: i64 = 5;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard)).route("/catalog", get(catalog))
}

async fn dashboard(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<DashboardResponse>, ApiError> {
    let db = state.db();
    let offset = state.local_offset();
    let now = primitive_now_utc();

    let tutor = if user.is_tutor {
        repositories::tutors::find_by_user_id(db, &user.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load tutor profile"))?
    } else {
        None
    };

    let (rank, completed_sessions, pending_sessions, upcoming_as_tutor) = match &tutor {
        Some(tutor) => {
            let completed_past = repositories::tutoring_sessions::count(
                db,
                &SessionFilter {
                    tutor_id: Some(tutor.id.as_str()),
                    statuses: &[TutoringStatus::Completed],
                    scheduled_before: Some(now),
                    ..SessionFilter::default()
                },
            )
            .await
            .map_err(|e| ApiError::internal(e, "Failed to count completed sessions"))?;

            let pending = repositories::tutoring_sessions::count(
                db,
                &SessionFilter {
                    tutor_id: Some(tutor.id.as_str()),
                    statuses: &[TutoringStatus::Pending],
                    ..SessionFilter::default()
                },
            )
            .await
            .map_err(|e| ApiError::internal(e, "Failed to count pending sessions"))?;

            let upcoming = repositories::tutoring_sessions::list_overviews(
                db,
                &SessionFilter {
                    tutor_id: Some(tutor.id.as_str()),
                    statuses: &[TutoringStatus::Accepted],
                    scheduled_from: Some(now),
                    ..SessionFilter::default()
                },
                Order::SoonestFirst,
                Some(UPCOMING_LIMIT),
            )
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list upcoming sessions"))?;

            (Some(rank_for(completed_past)), completed_past, pending, upcoming)
        }
        None => {
            let completed = repositories::tutoring_sessions::count(
                db,
                &SessionFilter {
                    student_id: Some(user.id.as_str()),
                    statuses: &[TutoringStatus::Completed],
                    ..SessionFilter::default()
                },
            )
            .await
            .map_err(|e| ApiError::internal(e, "Failed to count completed sessions"))?;

            let pending = repositories::tutoring_sessions::count(
                db,
                &SessionFilter {
                    student_id: Some(user.id.as_str()),
                    statuses: &[TutoringStatus::Pending],
                    ..SessionFilter::default()
                },
            )
            .await
            .map_err(|e| ApiError::internal(e, "Failed to count pending sessions"))?;

            (None, completed, pending, Vec::new())
        }
    };

    let upcoming_as_student = repositories::tutoring_sessions::list_overviews(
        db,
        &SessionFilter {
            student_id: Some(user.id.as_str()),
            statuses: &[TutoringStatus::Pending, TutoringStatus::Accepted],
            scheduled_from: Some(now),
            ..SessionFilter::default()
        },
        Order::SoonestFirst,
        Some(UPCOMING_LIMIT),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to list booked sessions"))?;

    let unread_notifications = repositories::notifications::count_unread(db, &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count notifications"))?;

    let top_tutors = repositories::tutors::top_rated(db, TOP_TUTORS_LIMIT)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list top tutors"))?;

    Ok(Json(DashboardResponse {
        full_name: user.full_name(),
        is_tutor: tutor.is_some(),
        rank,
        completed_sessions,
        pending_sessions,
        unread_notifications,
        upcoming_as_tutor: SessionOverviewResponse::from_rows(upcoming_as_tutor, offset),
        upcoming_as_student: SessionOverviewResponse::from_rows(upcoming_as_student, offset),
        top_tutors: top_tutors.into_iter().map(TutorSummary::from_db).collect(),
    }))
}

async fn catalog(State(state): State<AppState>) -> Result<Json<CatalogResponse>, ApiError> {
    let campuses = repositories::catalog::list_active_campuses(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list campuses"))?;
    let careers = repositories::catalog::list_active_careers(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list careers"))?;
    let subjects = repositories::catalog::list_active_subjects(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list subjects"))?;

    Ok(Json(CatalogResponse { campuses, careers, subjects }))
}
