use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use time::{Duration, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentAdmin;
use crate::api::validation::{check_password, validate_with};
use crate::core::time::{primitive_now_utc, to_primitive_utc};
use crate::core::{security, state::AppState};
use crate::db::models::User;
use crate::db::types::{AccountStatus, TutorLevel, TutoringStatus};
use crate::repositories;
use crate::repositories::tutoring_sessions::{Order, SessionFilter};
use crate::repositories::tutors::TutorFilter;
use crate::repositories::users::{UpdateUser, UserFilter};
use crate::schemas::admin::{
    AdminDashboardResponse, AdminSessionsQuery, AdminSessionsResponse, AdminTutorsQuery,
    AdminTutorsResponse, AdminUserDetailResponse, AdminUsersQuery, AdminUsersResponse,
    GroupResponse,
};
use crate::schemas::session::SessionOverviewResponse;
use crate::schemas::tutor::TutorSummary;
use crate::schemas::user::{UserResponse, UserUpdate};

const RECENT_SESSIONS: i64 = 10;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/dashboard", get(admin_dashboard))
        .route("/admin/users", get(list_users))
        .route("/admin/users/:id", get(user_detail).put(update_user))
        .route("/admin/sessions", get(list_sessions))
        .route("/admin/tutors", get(list_tutors))
        .route("/admin/groups", get(list_groups))
}

async fn admin_dashboard(
    State(state): State<AppState>,
    CurrentAdmin(_admin): CurrentAdmin,
) -> Result<Json<AdminDashboardResponse>, ApiError> {
    let db = state.db();
    let count_err = |e: sqlx::Error| ApiError::internal(e, "Failed to load dashboard counters");

    let total_users = repositories::users::count_all(db).await.map_err(count_err)?;
    let total_tutors = repositories::users::count_by_tutor_flag(db, true).await.map_err(count_err)?;
    let total_students =
        repositories::users::count_by_tutor_flag(db, false).await.map_err(count_err)?;
    let total_sessions = repositories::tutoring_sessions::count_all(db).await.map_err(count_err)?;
    let pending_sessions =
        repositories::tutoring_sessions::count_by_status(db, TutoringStatus::Pending)
            .await
            .map_err(count_err)?;
    let completed_sessions =
        repositories::tutoring_sessions::count_by_status(db, TutoringStatus::Completed)
            .await
            .map_err(count_err)?;
    let active_tutors = repositories::tutors::count_active(db).await.map_err(count_err)?;

    let recent = repositories::tutoring_sessions::list_overviews(
        db,
        &SessionFilter::default(),
        Order::LatestFirst,
        Some(RECENT_SESSIONS),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to list recent sessions"))?;

    Ok(Json(AdminDashboardResponse {
        total_users,
        total_tutors,
        total_students,
        total_sessions,
        pending_sessions,
        completed_sessions,
        active_tutors,
        recent_sessions: SessionOverviewResponse::from_rows(recent, state.local_offset()),
    }))
}

fn role_filter(value: Option<&str>) -> Option<bool> {
    match value.map(str::trim) {
        Some("tutor") => Some(true),
        Some("estudiante") => Some(false),
        _ => None,
    }
}

async fn list_users(
    State(state): State<AppState>,
    CurrentAdmin(_admin): CurrentAdmin,
    Query(query): Query<AdminUsersQuery>,
) -> Result<Json<AdminUsersResponse>, ApiError> {
    let filter = UserFilter {
        is_tutor: role_filter(query.rol.as_deref()),
        campus: query.sede.as_deref(),
        career: query.carrera.as_deref(),
        status: query.estado.as_deref().map(str::trim).and_then(AccountStatus::from_label),
        search: query.buscar.as_deref(),
    };

    let users = repositories::users::list_filtered(state.db(), &filter)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list users"))?;
    let campuses = repositories::users::distinct_campuses(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list campuses"))?;
    let careers = repositories::users::distinct_careers(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list careers"))?;

    Ok(Json(AdminUsersResponse {
        total: users.len(),
        users: users.into_iter().map(UserResponse::from_db).collect(),
        campuses,
        careers,
    }))
}

async fn user_detail(
    State(state): State<AppState>,
    CurrentAdmin(_admin): CurrentAdmin,
    Path(user_id): Path<String>,
) -> Result<Json<AdminUserDetailResponse>, ApiError> {
    let user = repositories::users::find_by_id(state.db(), &user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch user"))?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let tutor = match repositories::tutors::find_by_user_id(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load tutor profile"))?
    {
        Some(tutor) => repositories::tutors::find_with_user(state.db(), &tutor.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load tutor profile"))?
            .map(TutorSummary::from_db),
        None => None,
    };

    Ok(Json(AdminUserDetailResponse { user: UserResponse::from_db(user), tutor }))
}

/// Applies a staff edit to an account. Shared with the REST layer.
pub(crate) async fn apply_user_update(
    state: &AppState,
    actor: &User,
    user_id: &str,
    payload: UserUpdate,
) -> Result<User, ApiError> {
    let password = payload.password.as_deref().filter(|value| !value.is_empty());
    validate_with(&payload, |errors| {
        if let Some(password) = password {
            check_password(errors, "password", password);
        }
    })?;

    let hashed_password = password
        .map(security::hash_password)
        .transpose()
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;

    let params = UpdateUser {
        first_name: payload.first_name.map(|value| value.trim().to_string()),
        last_name: payload.last_name.map(|value| value.trim().to_string()),
        email: payload.email.map(|value| value.trim().to_string()),
        phone: payload.phone,
        campus: payload.campus,
        career: payload.career,
        current_semester: payload.current_semester,
        gpa: payload.gpa,
        free_tuition: payload.free_tuition,
        status: payload.status,
        is_tutor: payload.is_tutor,
        is_staff: payload.is_staff,
        is_superuser: None,
        is_active: payload.is_active,
        hashed_password,
    };

    let user = repositories::users::update(state.db(), user_id, params, primitive_now_utc())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to update user"))?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(
        user_id = %actor.id,
        target_user_id = %user.id,
        action = "user_updated",
        "Account updated by staff"
    );
    Ok(user)
}

async fn update_user(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    Path(user_id): Path<String>,
    Json(payload): Json<UserUpdate>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = apply_user_update(&state, &admin, &user_id, payload).await?;
    Ok(Json(UserResponse::from_db(user)))
}

/// `[from, before)` bounds in UTC for an admin period filter, evaluated in
/// local days. Unknown periods yield no bounds.
pub(crate) fn period_bounds(
    period: &str,
    now: OffsetDateTime,
    offset: UtcOffset,
) -> (Option<PrimitiveDateTime>, Option<PrimitiveDateTime>) {
    let today = now.to_offset(offset).date();
    let start_of_today =
        to_primitive_utc(PrimitiveDateTime::new(today, Time::MIDNIGHT).assume_offset(offset));

    match period {
        "hoy" => (Some(start_of_today), Some(start_of_today + Duration::days(1))),
        "proxima_semana" => (Some(start_of_today), Some(start_of_today + Duration::days(7))),
        "proximo_mes" => (Some(start_of_today), Some(start_of_today + Duration::days(30))),
        "pasadas" => (None, Some(to_primitive_utc(now))),
        _ => (None, None),
    }
}

async fn list_sessions(
    State(state): State<AppState>,
    CurrentAdmin(_admin): CurrentAdmin,
    Query(query): Query<AdminSessionsQuery>,
) -> Result<Json<AdminSessionsResponse>, ApiError> {
    let offset = state.local_offset();
    let status = query.estado.as_deref().map(str::trim).and_then(TutoringStatus::from_label);
    let statuses: Vec<TutoringStatus> = status.into_iter().collect();
    let (scheduled_from, scheduled_before) = query
        .periodo
        .as_deref()
        .map(|period| period_bounds(period.trim(), OffsetDateTime::now_utc(), offset))
        .unwrap_or((None, None));

    let filter = SessionFilter {
        statuses: &statuses,
        scheduled_from,
        scheduled_before,
        search: query.buscar.as_deref(),
        ..SessionFilter::default()
    };

    let total = repositories::tutoring_sessions::count(state.db(), &filter)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count sessions"))?;
    let sessions =
        repositories::tutoring_sessions::list_overviews(state.db(), &filter, Order::LatestFirst, None)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list sessions"))?;

    Ok(Json(AdminSessionsResponse {
        sessions: SessionOverviewResponse::from_rows(sessions, offset),
        total,
    }))
}

fn rating_band(value: Option<&str>) -> Option<f64> {
    match value.map(str::trim) {
        Some("4.5") => Some(4.5),
        Some("4.0") => Some(4.0),
        Some("3.5") => Some(3.5),
        _ => None,
    }
}

async fn list_tutors(
    State(state): State<AppState>,
    CurrentAdmin(_admin): CurrentAdmin,
    Query(query): Query<AdminTutorsQuery>,
) -> Result<Json<AdminTutorsResponse>, ApiError> {
    let filter = TutorFilter {
        level: query.nivel.as_deref().map(str::trim).and_then(TutorLevel::from_label),
        min_rating: rating_band(query.calificacion.as_deref()),
        search: query.buscar.as_deref(),
    };

    let tutors = repositories::tutors::list_filtered(state.db(), &filter)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list tutors"))?;

    Ok(Json(AdminTutorsResponse {
        total: tutors.len(),
        tutors: tutors.into_iter().map(TutorSummary::from_db).collect(),
    }))
}

async fn list_groups(
    State(state): State<AppState>,
    CurrentAdmin(_admin): CurrentAdmin,
) -> Result<Json<Vec<GroupResponse>>, ApiError> {
    let groups = repositories::groups::list_summaries(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list groups"))?;

    Ok(Json(groups.into_iter().map(GroupResponse::from_db).collect()))
}
