use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentAdmin, CurrentUser};
use crate::api::pagination::{Page, PageQuery};
use crate::api::validation::validate_payload;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::TutorWithUser;
use crate::repositories;
use crate::repositories::groups::TUTORS_GROUP;
use crate::repositories::tutors::{CreateTutor, TutorSearch, UpdateTutor};
use crate::repositories::users::UpdateUser;
use crate::schemas::session::SessionResponse;
use crate::schemas::tutor::{
    TutorCreate, TutorDetailResponse, TutorSearchQuery, TutorSummary, TutorUpdate,
};
use crate::schemas::user::UserResponse;

use super::collection_path;

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tutors).post(create_tutor))
        .route("/:id", get(get_tutor).patch(update_tutor).delete(deactivate_tutor))
}

async fn list_tutors(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Query(page): Query<PageQuery>,
    Query(query): Query<TutorSearchQuery>,
) -> Result<Json<Page<TutorSummary>>, ApiError> {
    let page_size = state.settings().api().page_size;
    let search =
        TutorSearch { name: query.nombre.as_deref(), specialty: query.especialidad.as_deref() };

    let count = repositories::tutors::count_search(state.db(), &search)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count tutors"))?;
    let tutors =
        repositories::tutors::search(state.db(), &search, Some((page.offset(page_size), page_size)))
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list tutors"))?;

    let results = tutors.into_iter().map(TutorSummary::from_db).collect();
    Ok(Json(Page::new(results, count, &page, page_size, &collection_path(&state, "tutors"))))
}

async fn load_tutor(state: &AppState, id: &str) -> Result<TutorWithUser, ApiError> {
    repositories::tutors::find_with_user(state.db(), id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load tutor"))?
        .ok_or_else(|| ApiError::NotFound("Tutor not found".to_string()))
}

async fn detail(state: &AppState, tutor: TutorWithUser) -> Result<TutorDetailResponse, ApiError> {
    let user = repositories::users::find_by_id(state.db(), &tutor.tutor.user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch user"))?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    let sessions = repositories::tutoring_sessions::list_for_tutor(state.db(), &tutor.tutor.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list sessions"))?;

    let offset = state.local_offset();
    Ok(TutorDetailResponse {
        tutor: TutorSummary::from_db(tutor),
        user: UserResponse::from_db(user),
        sessions: sessions.into_iter().map(|session| SessionResponse::from_db(session, offset)).collect(),
    })
}

async fn get_tutor(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(tutor_id): Path<String>,
) -> Result<Json<TutorDetailResponse>, ApiError> {
    let tutor = load_tutor(&state, &tutor_id).await?;
    Ok(Json(detail(&state, tutor).await?))
}

async fn create_tutor(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    Json(payload): Json<TutorCreate>,
) -> Result<(StatusCode, Json<TutorDetailResponse>), ApiError> {
    validate_payload(&payload)?;
    let user_id = payload.user_id.trim();

    repositories::users::find_by_id(state.db(), user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch user"))?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    let existing = repositories::tutors::find_by_user_id(state.db(), user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load tutor profile"))?;
    if existing.is_some() {
        return Err(ApiError::Conflict("User already has a tutor profile".to_string()));
    }

    let tutor_id = Uuid::new_v4().to_string();
    let certified_on = OffsetDateTime::now_utc().to_offset(state.local_offset()).date();

    let mut tx =
        state.db().begin().await.map_err(|e| ApiError::internal(e, "Failed to begin transaction"))?;
    repositories::tutors::create(
        &mut *tx,
        CreateTutor {
            id: &tutor_id,
            user_id,
            certified_on,
            level: payload.level,
            years_experience: payload.years_experience,
            specialties: payload.specialties.trim(),
            preferred_modality: payload.preferred_modality,
            bio: payload.bio.trim(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create tutor profile"))?;
    repositories::groups::add_member_by_name(&mut *tx, user_id, TUTORS_GROUP)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to assign group"))?;
    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit tutor profile"))?;

    repositories::users::update(
        state.db(),
        user_id,
        UpdateUser { is_tutor: Some(true), ..UpdateUser::default() },
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to flag user as tutor"))?;

    tracing::info!(
        user_id = %admin.id,
        tutor_id = %tutor_id,
        action = "tutor_created",
        "Tutor profile created by staff"
    );

    let tutor = load_tutor(&state, &tutor_id).await?;
    Ok((StatusCode::CREATED, Json(detail(&state, tutor).await?)))
}

async fn update_tutor(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    Path(tutor_id): Path<String>,
    Json(payload): Json<TutorUpdate>,
) -> Result<Json<TutorDetailResponse>, ApiError> {
    validate_payload(&payload)?;

    let updated = repositories::tutors::update(
        state.db(),
        &tutor_id,
        UpdateTutor {
            level: payload.level,
            years_experience: payload.years_experience,
            specialties: payload.specialties.map(|value| value.trim().to_string()),
            preferred_modality: payload.preferred_modality,
            bio: payload.bio,
            active: payload.active,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update tutor"))?;
    if !updated {
        return Err(ApiError::NotFound("Tutor not found".to_string()));
    }

    tracing::info!(
        user_id = %admin.id,
        tutor_id = %tutor_id,
        action = "tutor_updated",
        "Tutor profile updated by staff"
    );

    let tutor = load_tutor(&state, &tutor_id).await?;
    Ok(Json(detail(&state, tutor).await?))
}

async fn deactivate_tutor(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    Path(tutor_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let updated = repositories::tutors::update(
        state.db(),
        &tutor_id,
        UpdateTutor { active: Some(false), ..UpdateTutor::default() },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to deactivate tutor"))?;
    if !updated {
        return Err(ApiError::NotFound("Tutor not found".to_string()));
    }

    tracing::info!(
        user_id = %admin.id,
        tutor_id = %tutor_id,
        action = "tutor_deactivated",
        "Tutor profile deactivated by staff"
    );
    Ok(StatusCode::NO_CONTENT)
}
