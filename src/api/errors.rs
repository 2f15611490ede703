use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::api::validation::FieldErrors;
use crate::services::session_guard::SessionNotice;

pub(crate) const LOGIN_URL: &str = "/login";

#[derive(Debug, Serialize)]
struct ErrorResponse {
    status: u16,
    detail: String,
}

#[derive(Debug, Serialize)]
struct ValidationErrorResponse {
    status: u16,
    detail: &'static str,
    errors: FieldErrors,
}

#[derive(Debug, Serialize)]
struct TerminatedResponse {
    status: u16,
    detail: &'static str,
    notice: SessionNotice,
    login_url: &'static str,
}

#[derive(Debug)]
pub(crate) enum ApiError {
    Unauthorized(&'static str),
    Forbidden(&'static str),
    BadRequest(String),
    /// Per-field form errors.
    Validation(FieldErrors),
    NotFound(String),
    Conflict(String),
    TooManyRequests(&'static str),
    /// The session was ended by a guard; carries the cookie that clears it.
    SessionTerminated { notice: SessionNotice, clear_cookie: HeaderValue },
    Internal(String),
}

impl ApiError {
    /// Log the underlying error with context and return an `Internal` variant.
    pub(crate) fn internal(err: impl std::fmt::Display, context: &str) -> Self {
        tracing::error!(error = %err, "{context}");
        Self::Internal(context.to_string())
    }
}

fn plain(status: StatusCode, detail: String) -> Response {
    (status, Json(ErrorResponse { status: status.as_u16(), detail })).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized(message) => {
                let mut response = plain(StatusCode::UNAUTHORIZED, message.to_string());
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
                response
            }
            ApiError::Forbidden(message) => plain(StatusCode::FORBIDDEN, message.to_string()),
            ApiError::BadRequest(message) => plain(StatusCode::BAD_REQUEST, message),
            ApiError::Validation(errors) => {
                let status = StatusCode::BAD_REQUEST;
                (
                    status,
                    Json(ValidationErrorResponse {
                        status: status.as_u16(),
                        detail: "Validation failed",
                        errors,
                    }),
                )
                    .into_response()
            }
            ApiError::NotFound(message) => plain(StatusCode::NOT_FOUND, message),
            ApiError::Conflict(message) => plain(StatusCode::CONFLICT, message),
            ApiError::TooManyRequests(message) => {
                plain(StatusCode::TOO_MANY_REQUESTS, message.to_string())
            }
            ApiError::SessionTerminated { notice, clear_cookie } => {
                let status = StatusCode::UNAUTHORIZED;
                let mut response = (
                    status,
                    Json(TerminatedResponse {
                        status: status.as_u16(),
                        detail: "Session terminated",
                        notice,
                        login_url: LOGIN_URL,
                    }),
                )
                    .into_response();
                response.headers_mut().insert(header::SET_COOKIE, clear_cookie);
                response
            }
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "Internal server error");
                plain(StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        }
    }
}
