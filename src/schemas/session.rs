use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};
use validator::Validate;

use crate::core::time::{format_local_datetime, format_primitive};
use crate::db::models::{SessionOverview, TutoringSession};
use crate::db::types::{SessionModality, TutoringStatus};
use crate::schemas::message::MessageResponse;

pub(crate) const DEFAULT_DENY_REASON: &str = "Sin especificar";

#[derive(Debug, Serialize)]
pub(crate) struct SessionResponse {
    pub(crate) id: String,
    pub(crate) tutor_id: String,
    pub(crate) student_id: String,
    pub(crate) subject_id: String,
    pub(crate) modality: SessionModality,
    pub(crate) scheduled_at: String,
    /// `dd-mm-YYYY HH:MM` in the institution's local time.
    pub(crate) scheduled_local: String,
    pub(crate) duration_minutes: i32,
    pub(crate) status: TutoringStatus,
    pub(crate) topic: String,
    pub(crate) tutor_notes: String,
    pub(crate) tutor_rating: Option<i32>,
    pub(crate) student_rating: Option<i32>,
    pub(crate) started_at: Option<String>,
    pub(crate) ended_at: Option<String>,
    pub(crate) rejection_reason: Option<String>,
    pub(crate) created_at: String,
}

impl SessionResponse {
    pub(crate) fn from_db(session: TutoringSession, offset: UtcOffset) -> Self {
        Self {
            id: session.id,
            tutor_id: session.tutor_id,
            student_id: session.student_id,
            subject_id: session.subject_id,
            modality: session.modality,
            scheduled_at: format_primitive(session.scheduled_at),
            scheduled_local: format_local_datetime(session.scheduled_at, offset),
            duration_minutes: session.duration_minutes,
            status: session.status,
            topic: session.topic,
            tutor_notes: session.tutor_notes,
            tutor_rating: session.tutor_rating,
            student_rating: session.student_rating,
            started_at: session.started_at.map(format_primitive),
            ended_at: session.ended_at.map(format_primitive),
            rejection_reason: session.rejection_reason,
            created_at: format_primitive(session.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SessionOverviewResponse {
    #[serde(flatten)]
    pub(crate) session: SessionResponse,
    pub(crate) tutor_user_id: String,
    pub(crate) tutor_name: String,
    pub(crate) student_name: String,
    pub(crate) student_rut: String,
    pub(crate) subject_name: String,
}

impl SessionOverviewResponse {
    pub(crate) fn from_db(row: SessionOverview, offset: UtcOffset) -> Self {
        Self {
            session: SessionResponse::from_db(row.session, offset),
            tutor_user_id: row.tutor_user_id,
            tutor_name: row.tutor_name,
            student_name: row.student_name,
            student_rut: row.student_rut,
            subject_name: row.subject_name,
        }
    }

    pub(crate) fn from_rows(rows: Vec<SessionOverview>, offset: UtcOffset) -> Vec<Self> {
        rows.into_iter().map(|row| Self::from_db(row, offset)).collect()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum SessionRole {
    Tutor,
    Student,
}

#[derive(Debug, Serialize)]
pub(crate) struct SessionDetailResponse {
    pub(crate) session: SessionOverviewResponse,
    pub(crate) role: SessionRole,
    pub(crate) messages: Vec<MessageResponse>,
    pub(crate) can_rate_tutor: bool,
    pub(crate) can_rate_student: bool,
}

#[derive(Debug, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub(crate) enum MySessionsResponse {
    Tutor {
        pending: Vec<SessionOverviewResponse>,
        upcoming: Vec<SessionOverviewResponse>,
        awaiting_rating: Vec<SessionOverviewResponse>,
    },
    Student {
        upcoming: Vec<SessionOverviewResponse>,
        pending: Vec<SessionOverviewResponse>,
        past: Vec<SessionOverviewResponse>,
    },
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DenyRequest {
    #[serde(default)]
    #[serde(alias = "razon")]
    pub(crate) reason: Option<String>,
}

impl DenyRequest {
    pub(crate) fn reason(&self) -> &str {
        self.reason
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_DENY_REASON)
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct RatingRequest {
    #[serde(alias = "calificacion")]
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub(crate) rating: i32,
}

#[derive(Debug, Serialize)]
pub(crate) struct ActionResponse {
    pub(crate) detail: &'static str,
    pub(crate) session: SessionResponse,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct SessionCreate {
    pub(crate) tutor_id: String,
    pub(crate) subject_id: String,
    pub(crate) modality: SessionModality,
    #[serde(deserialize_with = "deserialize_rfc3339")]
    pub(crate) scheduled_at: OffsetDateTime,
    #[serde(default = "default_duration")]
    #[validate(range(min = 15, max = 480, message = "duration_minutes must be between 15 and 480"))]
    pub(crate) duration_minutes: i32,
    #[validate(length(min = 1, message = "topic must not be empty"))]
    pub(crate) topic: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub(crate) struct SessionUpdate {
    #[serde(default)]
    #[validate(length(min = 1, message = "topic must not be empty"))]
    pub(crate) topic: Option<String>,
    #[serde(default)]
    pub(crate) tutor_notes: Option<String>,
    #[serde(default)]
    pub(crate) modality: Option<SessionModality>,
}

/// REST detail with the conversation nested.
#[derive(Debug, Serialize)]
pub(crate) struct SessionWithMessages {
    #[serde(flatten)]
    pub(crate) session: SessionResponse,
    pub(crate) messages: Vec<MessageResponse>,
}

fn default_duration() -> i32 {
    60
}

fn deserialize_rfc3339<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    OffsetDateTime::parse(raw.trim(), &Rfc3339)
        .map_err(|_| D::Error::custom(format!("invalid datetime: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_deny_reason_falls_back() {
        assert_eq!(DenyRequest::default().reason(), DEFAULT_DENY_REASON);
        let request = DenyRequest { reason: Some("   ".to_string()) };
        assert_eq!(request.reason(), DEFAULT_DENY_REASON);
        let request: DenyRequest = serde_json::from_str(r#"{"razon":"Sin cupo"}"#).unwrap();
        assert_eq!(request.reason(), "Sin cupo");
    }

    #[test]
    fn session_create_requires_rfc3339() {
        let ok: Result<SessionCreate, _> = serde_json::from_str(
            r#"{"tutor_id":"t","subject_id":"s","modality":"Online",
                "scheduled_at":"2025-03-17T10:00:00-03:00","topic":"Derivadas"}"#,
        );
        assert_eq!(ok.unwrap().duration_minutes, 60);

        let bad: Result<SessionCreate, _> = serde_json::from_str(
            r#"{"tutor_id":"t","subject_id":"s","modality":"Online",
                "scheduled_at":"mañana","topic":"Derivadas"}"#,
        );
        assert!(bad.is_err());
    }
}
