use serde::{Deserialize, Serialize};

use crate::db::models::GroupSummary;
use crate::schemas::session::SessionOverviewResponse;
use crate::schemas::tutor::TutorSummary;
use crate::schemas::user::UserResponse;

#[derive(Debug, Serialize)]
pub(crate) struct AdminDashboardResponse {
    pub(crate) total_users: i64,
    pub(crate) total_tutors: i64,
    pub(crate) total_students: i64,
    pub(crate) total_sessions: i64,
    pub(crate) pending_sessions: i64,
    pub(crate) completed_sessions: i64,
    pub(crate) active_tutors: i64,
    pub(crate) recent_sessions: Vec<SessionOverviewResponse>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AdminUsersQuery {
    #[serde(default)]
    pub(crate) rol: Option<String>,
    #[serde(default)]
    pub(crate) sede: Option<String>,
    #[serde(default)]
    pub(crate) carrera: Option<String>,
    #[serde(default)]
    pub(crate) buscar: Option<String>,
    #[serde(default)]
    pub(crate) estado: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AdminUsersResponse {
    pub(crate) users: Vec<UserResponse>,
    pub(crate) total: usize,
    pub(crate) campuses: Vec<String>,
    pub(crate) careers: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AdminUserDetailResponse {
    pub(crate) user: UserResponse,
    pub(crate) tutor: Option<TutorSummary>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AdminSessionsQuery {
    #[serde(default)]
    pub(crate) estado: Option<String>,
    #[serde(default)]
    pub(crate) periodo: Option<String>,
    #[serde(default)]
    pub(crate) buscar: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AdminSessionsResponse {
    pub(crate) sessions: Vec<SessionOverviewResponse>,
    pub(crate) total: i64,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AdminTutorsQuery {
    #[serde(default)]
    pub(crate) nivel: Option<String>,
    #[serde(default)]
    pub(crate) calificacion: Option<String>,
    #[serde(default)]
    pub(crate) buscar: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AdminTutorsResponse {
    pub(crate) tutors: Vec<TutorSummary>,
    pub(crate) total: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct GroupResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) permissions: Vec<String>,
    pub(crate) member_count: i64,
}

impl GroupResponse {
    pub(crate) fn from_db(group: GroupSummary) -> Self {
        Self {
            id: group.id,
            name: group.name,
            permissions: group.permissions,
            member_count: group.member_count,
        }
    }
}
