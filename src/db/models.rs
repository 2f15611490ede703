use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, PrimitiveDateTime, Time};

use crate::db::types::{
    AccountStatus, AchievementCategory, CareerArea, DayOfWeek, Gender, ModalityPreference,
    NotificationKind, ResourceKind, SessionModality, TutorLevel, TutoringStatus,
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct User {
    pub(crate) id: String,
    pub(crate) rut: String,
    pub(crate) username: String,
    pub(crate) hashed_password: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) email: String,
    pub(crate) phone: Option<String>,
    pub(crate) birth_date: Option<Date>,
    pub(crate) gender: Gender,
    pub(crate) campus: String,
    pub(crate) career: String,
    pub(crate) current_semester: i32,
    pub(crate) gpa: f64,
    pub(crate) free_tuition: bool,
    pub(crate) status: AccountStatus,
    pub(crate) enrolled_on: Option<Date>,
    pub(crate) is_tutor: bool,
    pub(crate) is_staff: bool,
    pub(crate) is_superuser: bool,
    pub(crate) is_active: bool,
    pub(crate) active_session_id: Option<String>,
    pub(crate) date_joined: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

impl User {
    pub(crate) fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    pub(crate) fn is_admin(&self) -> bool {
        self.is_staff || self.is_superuser
    }
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct AuthSession {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) last_activity: Option<PrimitiveDateTime>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) expires_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Campus {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) city: String,
    pub(crate) region: String,
    pub(crate) address: String,
    pub(crate) phone: String,
    pub(crate) email: String,
    pub(crate) active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Career {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) code: String,
    pub(crate) area: CareerArea,
    pub(crate) level: String,
    pub(crate) duration_semesters: i32,
    pub(crate) active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Subject {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) code: String,
    pub(crate) career_id: String,
    pub(crate) semester: i32,
    pub(crate) is_critical: bool,
    pub(crate) active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Tutor {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) certified_on: Date,
    pub(crate) level: TutorLevel,
    pub(crate) years_experience: i32,
    pub(crate) average_rating: f64,
    pub(crate) total_sessions: i32,
    pub(crate) accumulated_hours: f64,
    pub(crate) specialties: String,
    pub(crate) preferred_modality: ModalityPreference,
    pub(crate) bio: String,
    pub(crate) active: bool,
}

/// Tutor profile joined with the columns of its account that listings need.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct TutorWithUser {
    #[sqlx(flatten)]
    pub(crate) tutor: Tutor,
    pub(crate) rut: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) email: String,
    pub(crate) campus: String,
    pub(crate) career: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct AvailabilitySlot {
    pub(crate) id: String,
    pub(crate) tutor_id: String,
    pub(crate) day: DayOfWeek,
    pub(crate) start_time: Time,
    pub(crate) end_time: Time,
    pub(crate) active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct TutoringSession {
    pub(crate) id: String,
    pub(crate) tutor_id: String,
    pub(crate) student_id: String,
    pub(crate) subject_id: String,
    pub(crate) modality: SessionModality,
    pub(crate) scheduled_at: PrimitiveDateTime,
    pub(crate) duration_minutes: i32,
    pub(crate) status: TutoringStatus,
    pub(crate) topic: String,
    pub(crate) tutor_notes: String,
    pub(crate) tutor_rating: Option<i32>,
    pub(crate) student_rating: Option<i32>,
    pub(crate) started_at: Option<PrimitiveDateTime>,
    pub(crate) ended_at: Option<PrimitiveDateTime>,
    pub(crate) rejection_reason: Option<String>,
    pub(crate) created_at: PrimitiveDateTime,
}

/// Session row plus the display names of everything it references.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct SessionOverview {
    #[sqlx(flatten)]
    pub(crate) session: TutoringSession,
    pub(crate) tutor_user_id: String,
    pub(crate) tutor_name: String,
    pub(crate) student_name: String,
    pub(crate) student_rut: String,
    pub(crate) subject_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Message {
    pub(crate) id: String,
    pub(crate) session_id: String,
    pub(crate) sender_id: String,
    pub(crate) body: String,
    pub(crate) sent_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct MessageWithSender {
    #[sqlx(flatten)]
    pub(crate) message: Message,
    pub(crate) sender_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct EducationalResource {
    pub(crate) id: String,
    pub(crate) tutor_id: String,
    pub(crate) subject_id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) kind: ResourceKind,
    pub(crate) file_url: Option<String>,
    pub(crate) content: String,
    pub(crate) downloads: i32,
    pub(crate) active: bool,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Achievement {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) category: AchievementCategory,
    pub(crate) points: i32,
    pub(crate) icon: String,
    pub(crate) active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Notification {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) session_id: Option<String>,
    pub(crate) kind: NotificationKind,
    pub(crate) title: String,
    pub(crate) message: String,
    pub(crate) read: bool,
    pub(crate) sent_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct GroupSummary {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) permissions: Vec<String>,
    pub(crate) member_count: i64,
}
