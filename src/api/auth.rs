use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::api::session_layer::{clear_session_cookie, session_cookie, AuthContext};
use crate::api::validation::{check_password, is_valid_rut, validate_with};
use crate::core::time::{primitive_now_utc, to_primitive_utc};
use crate::core::redis::Throttle;
use crate::core::{metrics, security, state::AppState};
use crate::db::models::User;
use crate::db::types::{ModalityPreference, TutorLevel};
use crate::repositories;
use crate::repositories::groups::{STUDENTS_GROUP, TUTORS_GROUP};
use crate::repositories::tutors::CreateTutor;
use crate::repositories::users::CreateUser;
use crate::schemas::auth::{LogoutResponse, SessionResponse};
use crate::schemas::user::{LoginRequest, RegisterRequest, UserResponse};

const TUTOR_REQUIRED_FIELD: &str = "This field is required for tutors";

type SessionReply = (StatusCode, [(header::HeaderName, HeaderValue); 1], Json<SessionResponse>);

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/profile", get(profile))
}

async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<SessionReply, ApiError> {
    if !state.redis().allow(Throttle::Register, payload.rut.trim()).await {
        return Err(ApiError::TooManyRequests("Too many registration attempts, try again later"));
    }

    let user = create_account(&state, &payload).await?;
    let (token, cookie) = start_session(&state, &user).await?;
    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(SessionResponse {
            access_token: token,
            token_type: "bearer".to_string(),
            user: UserResponse::from_db(user),
        }),
    ))
}

/// Validates a registration form and creates the account, its tutor profile
/// when requested, and its group membership.
pub(crate) async fn create_account(
    state: &AppState,
    payload: &RegisterRequest,
) -> Result<User, ApiError> {
    let rut = payload.rut.trim();
    let specialties = payload.specialties.as_deref().map(str::trim).unwrap_or_default();
    validate_with(payload, |errors| {
        if !is_valid_rut(rut) {
            errors.add("rut", "RUT must look like 12.345.678-9");
        }
        check_password(errors, "password1", &payload.password1);
        if payload.password1 != payload.password2 {
            errors.add("password2", "The two password fields didn't match");
        }
        if payload.is_tutor {
            if specialties.is_empty() {
                errors.add("specialties", TUTOR_REQUIRED_FIELD);
            }
            if payload.years_experience.is_none() {
                errors.add("years_experience", TUTOR_REQUIRED_FIELD);
            }
        }
    })?;

    let username = match payload.username.trim() {
        "" => rut,
        value => value,
    };

    let existing = repositories::users::exists_by_rut_or_username(state.db(), rut, username)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check existing user"))?;
    if existing.is_some() {
        return Err(ApiError::Conflict("User with this RUT already exists".to_string()));
    }

    let hashed_password = security::hash_password(&payload.password1)
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;
    let user_id = Uuid::new_v4().to_string();

    let mut tx =
        state.db().begin().await.map_err(|e| ApiError::internal(e, "Failed to begin transaction"))?;

    let user = repositories::users::create(
        &mut *tx,
        CreateUser {
            id: &user_id,
            rut,
            username,
            hashed_password,
            first_name: payload.first_name.trim(),
            last_name: payload.last_name.trim(),
            email: payload.email.trim(),
            phone: payload.phone.as_deref().map(str::trim).filter(|value| !value.is_empty()),
            birth_date: None,
            gender: payload.gender,
            campus: payload.campus.trim(),
            career: payload.career.trim(),
            current_semester: payload.current_semester,
            gpa: payload.gpa,
            is_tutor: payload.is_tutor,
            is_staff: false,
            is_superuser: false,
            now: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create user"))?;

    if payload.is_tutor {
        let tutor_id = Uuid::new_v4().to_string();
        let certified_on = OffsetDateTime::now_utc().to_offset(state.local_offset()).date();
        repositories::tutors::create(
            &mut *tx,
            CreateTutor {
                id: &tutor_id,
                user_id: &user.id,
                certified_on,
                level: TutorLevel::Novato,
                years_experience: payload.years_experience.unwrap_or_default(),
                specialties,
                preferred_modality: ModalityPreference::Ambas,
                bio: "",
            },
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to create tutor profile"))?;
    }

    let group = if payload.is_tutor { TUTORS_GROUP } else { STUDENTS_GROUP };
    repositories::groups::add_member_by_name(&mut *tx, &user.id, group)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to assign group"))?;

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit registration"))?;

    tracing::info!(
        user_id = %user.id,
        is_tutor = user.is_tutor,
        action = "user_registered",
        "User registered"
    );
    Ok(user)
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<SessionReply, ApiError> {
    let rut = payload.rut.trim();
    if !state.redis().allow(Throttle::Login, rut).await {
        metrics::record_login("rate_limited");
        return Err(ApiError::TooManyRequests("Too many login attempts, try again later"));
    }

    let user = repositories::users::find_by_rut(state.db(), rut)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch user"))?;

    let Some(user) = user else {
        metrics::record_login("invalid");
        return Err(ApiError::Unauthorized("Incorrect RUT or password"));
    };

    let verified = security::verify_password(&payload.password, &user.hashed_password)
        .map_err(|e| ApiError::internal(e, "Failed to verify password"))?;
    if !verified {
        metrics::record_login("invalid");
        return Err(ApiError::Unauthorized("Incorrect RUT or password"));
    }
    if !user.is_active {
        metrics::record_login("invalid");
        return Err(ApiError::Unauthorized("Inactive user"));
    }

    state.redis().clear(Throttle::Login, rut).await;

    let (token, cookie) = start_session(&state, &user).await?;
    metrics::record_login("success");

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(SessionResponse {
            access_token: token,
            token_type: "bearer".to_string(),
            user: UserResponse::from_db(user),
        }),
    ))
}

/// Creates a session record and makes it the only one allowed for the account.
async fn start_session(state: &AppState, user: &User) -> Result<(String, HeaderValue), ApiError> {
    let now = OffsetDateTime::now_utc();
    let lifetime = Duration::seconds(state.settings().security().session_cookie_age_seconds as i64);
    let session_id = Uuid::new_v4().to_string();

    let mut tx =
        state.db().begin().await.map_err(|e| ApiError::internal(e, "Failed to begin transaction"))?;
    repositories::auth_sessions::create(
        &mut *tx,
        &session_id,
        &user.id,
        to_primitive_utc(now),
        to_primitive_utc(now + lifetime),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create session"))?;
    repositories::users::set_active_session(&mut *tx, &user.id, &session_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to record active session"))?;
    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit session"))?;

    let token = security::create_session_token(&user.id, &session_id, state.settings())
        .map_err(|e| ApiError::internal(e, "Failed to create session token"))?;
    let cookie = session_cookie(&token, state.settings())?;

    tracing::info!(
        user_id = %user.id,
        session_id = %session_id,
        action = "login",
        "Session started"
    );
    Ok((token, cookie))
}

async fn logout(
    State(state): State<AppState>,
    context: Option<AuthContext>,
) -> Result<([(header::HeaderName, HeaderValue); 1], Json<LogoutResponse>), ApiError> {
    if let Some(context) = context {
        repositories::auth_sessions::delete(state.db(), &context.session_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to delete session"))?;
        tracing::info!(
            user_id = %context.user.id,
            session_id = %context.session_id,
            action = "logout",
            "Session closed"
        );
    }

    Ok((
        [(header::SET_COOKIE, clear_session_cookie(state.settings()))],
        Json(LogoutResponse { detail: "Logged out" }),
    ))
}

async fn profile(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from_db(user))
}

#[cfg(test)]
mod tests;
