use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::api::validation::{validate_with, FieldErrors};
use crate::core::time::{format_clock, format_local_datetime, primitive_now_utc, to_primitive_utc};
use crate::core::{metrics, state::AppState};
use crate::db::models::{AvailabilitySlot, TutorWithUser};
use crate::db::types::{SessionModality, TutoringStatus};
use crate::repositories;
use crate::repositories::tutoring_sessions::{CreateSession, SessionFilter};
use crate::repositories::tutors::TutorSearch;
use crate::schemas::session::{ActionResponse, SessionResponse};
use crate::schemas::tutor::{
    BookingOption, BookingOptionsResponse, BookingRequest, TutorListResponse,
    TutorProfileResponse, TutorSearchQuery, TutorSummary,
};
use crate::services::booking_date::{self, SlotChoice};
use crate::services::{achievements, notifications};

/// Every booking reserves one availability slot.
const BOOKING_DURATION_MINUTES: i32 = 60;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/tutors", get(list_tutors))
        .route("/tutors/:id", get(tutor_profile))
        .route("/tutors/:id/booking-options", get(booking_options))
        .route("/tutors/:id/book", post(book_session))
}

async fn list_tutors(
    State(state): State<AppState>,
    Query(query): Query<TutorSearchQuery>,
) -> Result<Json<TutorListResponse>, ApiError> {
    let nombre = query.nombre.unwrap_or_default().trim().to_string();
    let especialidad = query.especialidad.unwrap_or_default().trim().to_string();

    let tutors = repositories::tutors::search(
        state.db(),
        &TutorSearch { name: Some(nombre.as_str()), specialty: Some(especialidad.as_str()) },
        None,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to search tutors"))?;

    Ok(Json(TutorListResponse {
        tutors: tutors.into_iter().map(TutorSummary::from_db).collect(),
        nombre,
        especialidad,
    }))
}

async fn load_tutor(state: &AppState, tutor_id: &str) -> Result<TutorWithUser, ApiError> {
    repositories::tutors::find_with_user(state.db(), tutor_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load tutor"))?
        .ok_or_else(|| ApiError::NotFound("Tutor not found".to_string()))
}

async fn tutor_profile(
    State(state): State<AppState>,
    Path(tutor_id): Path<String>,
) -> Result<Json<TutorProfileResponse>, ApiError> {
    let tutor = load_tutor(&state, &tutor_id).await?;

    let completed_sessions = repositories::tutoring_sessions::count(
        state.db(),
        &SessionFilter {
            tutor_id: Some(tutor_id.as_str()),
            statuses: &[TutoringStatus::Completed],
            ..SessionFilter::default()
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to count completed sessions"))?;

    Ok(Json(TutorProfileResponse { tutor: TutorSummary::from_db(tutor), completed_sessions }))
}

pub(crate) fn booking_option(slot: &AvailabilitySlot) -> BookingOption {
    let day = slot.day.label();
    let start = format_clock(slot.start_time);
    BookingOption {
        value: format!("{day} {start}"),
        label: format!("{day} {start} a {}", format_clock(slot.end_time)),
    }
}

async fn booking_options(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(tutor_id): Path<String>,
) -> Result<Json<BookingOptionsResponse>, ApiError> {
    let tutor = load_tutor(&state, &tutor_id).await?;

    let slots = repositories::availability::list_active_for_tutor(state.db(), &tutor_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load availability"))?;
    let subjects = repositories::catalog::list_active_subjects(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list subjects"))?;

    Ok(Json(BookingOptionsResponse {
        tutor: TutorSummary::from_db(tutor),
        slots: slots.iter().map(booking_option).collect(),
        subjects,
        modalities: [SessionModality::Presencial, SessionModality::Online],
    }))
}

async fn book_session(
    State(state): State<AppState>,
    CurrentUser(student): CurrentUser,
    Path(tutor_id): Path<String>,
    Json(payload): Json<BookingRequest>,
) -> Result<(StatusCode, Json<ActionResponse>), ApiError> {
    let choice = SlotChoice::parse(payload.slot.trim());
    validate_with(&payload, |errors| {
        if let Err(err) = &choice {
            errors.add("slot", err.to_string());
        }
        if payload.subject_id.trim().is_empty() {
            errors.add("subject_id", "This field is required");
        }
    })?;
    let choice = choice.map_err(|err| ApiError::BadRequest(err.to_string()))?;

    let db = state.db();
    let tutor = load_tutor(&state, &tutor_id).await?;
    if !tutor.tutor.active {
        return Err(ApiError::NotFound("Tutor not found".to_string()));
    }
    if tutor.tutor.user_id == student.id {
        return Err(ApiError::BadRequest("You cannot book a session with yourself".to_string()));
    }

    let mut errors = FieldErrors::new();
    let slot =
        repositories::availability::find_active_slot(db, &tutor_id, choice.day, choice.time)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load availability"))?;
    if slot.is_none() {
        errors.add("slot", "The selected time is not offered by this tutor");
    }
    let subject = repositories::catalog::find_subject(db, payload.subject_id.trim())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load subject"))?;
    if !subject.is_some_and(|subject| subject.active) {
        errors.add("subject_id", "Select a valid subject");
    }
    errors.into_result()?;

    let tutor_user = repositories::users::find_by_id(db, &tutor.tutor.user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load tutor account"))?
        .ok_or_else(|| ApiError::NotFound("Tutor not found".to_string()))?;

    let offset = state.local_offset();
    let scheduled = booking_date::resolve(choice.day, choice.time, OffsetDateTime::now_utc(), offset);
    let scheduled_at = to_primitive_utc(scheduled);
    let when = format_local_datetime(scheduled_at, offset);
    let session_id = Uuid::new_v4().to_string();

    let mut tx = db.begin().await.map_err(|e| ApiError::internal(e, "Failed to begin transaction"))?;

    let session = repositories::tutoring_sessions::create(
        &mut *tx,
        CreateSession {
            id: &session_id,
            tutor_id: &tutor_id,
            student_id: &student.id,
            subject_id: payload.subject_id.trim(),
            modality: payload.modality,
            scheduled_at,
            duration_minutes: BOOKING_DURATION_MINUTES,
            topic: payload.topic.trim(),
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create session"))?;

    let to_tutor = notifications::booking_requested(&student.first_name, &when);
    notifications::send(&mut *tx, &tutor_user.id, Some(session.id.as_str()), &to_tutor)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to notify tutor"))?;
    let to_student = notifications::booking_sent(&tutor_user.first_name);
    notifications::send(&mut *tx, &student.id, Some(session.id.as_str()), &to_student)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to notify student"))?;

    achievements::award_for_booking(&mut tx, &student.id, &tutor_user)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to award achievement"))?;

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit booking"))?;

    metrics::record_tutoring_transition(TutoringStatus::Pending.as_str());
    tracing::info!(
        user_id = %student.id,
        session_id = %session.id,
        tutor_id = %tutor_id,
        scheduled_at = %when,
        action = "session_booked",
        "Tutoring session booked"
    );

    Ok((
        StatusCode::CREATED,
        Json(ActionResponse {
            detail: "Tutoring session requested",
            session: SessionResponse::from_db(session, offset),
        }),
    ))
}

#[cfg(test)]
mod tests;
