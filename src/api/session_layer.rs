use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use time::Duration;

use crate::api::errors::ApiError;
use crate::core::config::Settings;
use crate::core::time::primitive_now_utc;
use crate::core::{metrics, security, state::AppState};
use crate::db::models::User;
use crate::repositories;
use crate::services::session_guard::{self, GuardDecision, SessionSnapshot};

pub(crate) const SESSION_COOKIE: &str = "tutorias_session";

/// Authenticated account and the session record the request arrived with.
#[derive(Debug, Clone)]
pub(crate) struct AuthContext {
    pub(crate) user: User,
    pub(crate) session_id: String,
}

/// Resolves the session cookie (or bearer token), applies the single-session
/// and idle guards and stores an [`AuthContext`] in the request extensions.
/// Requests without a usable session continue anonymously.
pub(crate) async fn session_guard(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = session_token(request.headers()) else {
        return next.run(request).await;
    };

    match authenticate(&state, &token).await {
        Ok(Some(context)) => {
            request.extensions_mut().insert(context);
        }
        Ok(None) => {}
        Err(err) => return err.into_response(),
    }

    next.run(request).await
}

async fn authenticate(state: &AppState, token: &str) -> Result<Option<AuthContext>, ApiError> {
    let Ok(claims) = security::verify_session_token(token, state.settings()) else {
        return Ok(None);
    };

    let now = primitive_now_utc();
    let session = repositories::auth_sessions::find_live(state.db(), &claims.sid, now)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load session"))?;
    let Some(session) = session.filter(|session| session.user_id == claims.sub) else {
        return Ok(None);
    };

    let user = repositories::users::find_by_id(state.db(), &session.user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load user"))?;
    let Some(mut user) = user.filter(|user| user.is_active) else {
        return Ok(None);
    };

    let idle_timeout =
        Duration::minutes(state.settings().security().idle_timeout_minutes as i64);
    let snapshot = SessionSnapshot {
        session_id: &session.id,
        owner_session_id: user.active_session_id.as_deref(),
        last_activity: session.last_activity,
    };

    match session_guard::evaluate(snapshot, now, idle_timeout) {
        GuardDecision::Terminate(notice) => {
            repositories::auth_sessions::delete(state.db(), &session.id)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to delete session"))?;
            tracing::info!(
                user_id = %user.id,
                session_id = %session.id,
                reason = notice.reason(),
                action = "session_terminated",
                "Session terminated by guard"
            );
            metrics::record_session_termination(notice.reason());
            Err(ApiError::SessionTerminated {
                notice,
                clear_cookie: clear_session_cookie(state.settings()),
            })
        }
        GuardDecision::Proceed { claim_ownership } => {
            if claim_ownership {
                let claimed =
                    repositories::users::claim_active_session(state.db(), &user.id, &session.id)
                        .await
                        .map_err(|e| ApiError::internal(e, "Failed to claim session"))?;
                if claimed {
                    user.active_session_id = Some(session.id.clone());
                }
            }
            repositories::auth_sessions::touch(state.db(), &session.id, now)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to update session activity"))?;

            Ok(Some(AuthContext { user, session_id: session.id }))
        }
    }
}

/// Session token from the cookie, falling back to `Authorization: Bearer`.
pub(crate) fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = cookie_value(headers, SESSION_COOKIE) {
        return Some(value.to_string());
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value)
}

fn cookie_attributes(settings: &Settings) -> &'static str {
    if settings.security().secure_cookies {
        "HttpOnly; Path=/; SameSite=Strict; Secure"
    } else {
        "HttpOnly; Path=/; SameSite=Lax"
    }
}

pub(crate) fn session_cookie(token: &str, settings: &Settings) -> Result<HeaderValue, ApiError> {
    let value = format!(
        "{SESSION_COOKIE}={token}; Max-Age={}; {}",
        settings.security().session_cookie_age_seconds,
        cookie_attributes(settings)
    );
    HeaderValue::from_str(&value).map_err(|e| ApiError::internal(e, "Failed to build session cookie"))
}

pub(crate) fn clear_session_cookie(settings: &Settings) -> HeaderValue {
    let value = format!("{SESSION_COOKIE}=; Max-Age=0; {}", cookie_attributes(settings));
    HeaderValue::from_str(&value)
        .unwrap_or_else(|_| HeaderValue::from_static("tutorias_session=; Max-Age=0; Path=/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_wins_over_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; tutorias_session=abc"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        assert_eq!(session_token(&headers).as_deref(), Some("abc"));
    }

    #[test]
    fn bearer_is_used_without_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        assert_eq!(session_token(&headers).as_deref(), Some("xyz"));
    }

    #[test]
    fn empty_cookie_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("tutorias_session="));
        assert_eq!(session_token(&headers), None);
    }
}
