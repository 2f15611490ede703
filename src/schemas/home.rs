use serde::Serialize;

use crate::db::models::{Campus, Career, Subject};
use crate::db::types::TutorLevel;
use crate::schemas::session::SessionOverviewResponse;
use crate::schemas::tutor::TutorSummary;

#[derive(Debug, Serialize)]
pub(crate) struct HomeResponse {
    pub(crate) top_tutors: Vec<TutorSummary>,
    pub(crate) active_tutors: i64,
    pub(crate) completed_sessions: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct DashboardResponse {
    pub(crate) full_name: String,
    pub(crate) is_tutor: bool,
    /// Present for tutors only, derived from completed past sessions.
    pub(crate) rank: Option<TutorLevel>,
    pub(crate) completed_sessions: i64,
    pub(crate) pending_sessions: i64,
    pub(crate) unread_notifications: i64,
    pub(crate) upcoming_as_tutor: Vec<SessionOverviewResponse>,
    pub(crate) upcoming_as_student: Vec<SessionOverviewResponse>,
    pub(crate) top_tutors: Vec<TutorSummary>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CatalogResponse {
    pub(crate) campuses: Vec<Campus>,
    pub(crate) careers: Vec<Career>,
    pub(crate) subjects: Vec<Subject>,
}
