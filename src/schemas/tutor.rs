use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::models::{Subject, TutorWithUser};
use crate::db::types::{ModalityPreference, SessionModality, TutorLevel};
use crate::schemas::session::SessionResponse;
use crate::schemas::user::UserResponse;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TutorSearchQuery {
    #[serde(default)]
    pub(crate) nombre: Option<String>,
    #[serde(default)]
    pub(crate) especialidad: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TutorSummary {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) rut: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) full_name: String,
    pub(crate) email: String,
    pub(crate) campus: String,
    pub(crate) career: String,
    pub(crate) certified_on: String,
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

impl TutorSummary {
    pub(crate) fn from_db(row: TutorWithUser) -> Self {
        let tutor = row.tutor;
        Self {
            id: tutor.id,
            user_id: tutor.user_id,
            rut: row.rut,
            full_name: format!("{} {}", row.first_name, row.last_name).trim().to_string(),
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            campus: row.campus,
            career: row.career,
            certified_on: tutor.certified_on.to_string(),
            level: tutor.level,
            years_experience: tutor.years_experience,
            average_rating: tutor.average_rating,
            total_sessions: tutor.total_sessions,
            accumulated_hours: tutor.accumulated_hours,
            specialties: tutor.specialties,
            preferred_modality: tutor.preferred_modality,
            bio: tutor.bio,
            active: tutor.active,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TutorListResponse {
    pub(crate) tutors: Vec<TutorSummary>,
    pub(crate) nombre: String,
    pub(crate) especialidad: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct TutorProfileResponse {
    pub(crate) tutor: TutorSummary,
    pub(crate) completed_sessions: i64,
}

/// One selectable weekly slot, e.g. value `Lunes 10:00`, label `Lunes 10:00 a 11:00`.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub(crate) struct BookingOption {
    pub(crate) value: String,
    pub(crate) label: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct BookingOptionsResponse {
    pub(crate) tutor: TutorSummary,
    pub(crate) slots: Vec<BookingOption>,
    pub(crate) subjects: Vec<Subject>,
    pub(crate) modalities: [SessionModality; 2],
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct BookingRequest {
    #[serde(alias = "hora_disponible")]
    pub(crate) slot: String,
    #[serde(alias = "asignatura")]
    pub(crate) subject_id: String,
    #[serde(alias = "modalidad")]
    pub(crate) modality: SessionModality,
    #[serde(alias = "tema_solicitud")]
    #[validate(length(min = 1, message = "topic must not be empty"))]
    pub(crate) topic: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct TutorCreate {
    pub(crate) user_id: String,
    #[serde(default = "default_level")]
    pub(crate) level: TutorLevel,
    #[serde(default)]
    #[validate(range(min = 0, message = "years_experience must be non-negative"))]
    pub(crate) years_experience: i32,
    #[validate(length(min = 1, message = "specialties must not be empty"))]
    pub(crate) specialties: String,
    #[serde(default = "default_modality")]
    pub(crate) preferred_modality: ModalityPreference,
    #[serde(default)]
    pub(crate) bio: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub(crate) struct TutorUpdate {
    #[serde(default)]
    pub(crate) level: Option<TutorLevel>,
    #[serde(default)]
    #[validate(range(min = 0, message = "years_experience must be non-negative"))]
    pub(crate) years_experience: Option<i32>,
    #[serde(default)]
    pub(crate) specialties: Option<String>,
    #[serde(default)]
    pub(crate) preferred_modality: Option<ModalityPreference>,
    #[serde(default)]
    pub(crate) bio: Option<String>,
    #[serde(default)]
    pub(crate) active: Option<bool>,
}

/// REST detail: the profile with its account and sessions nested.
#[derive(Debug, Serialize)]
pub(crate) struct TutorDetailResponse {
    #[serde(flatten)]
    pub(crate) tutor: TutorSummary,
    pub(crate) user: UserResponse,
    pub(crate) sessions: Vec<SessionResponse>,
}

fn default_level() -> TutorLevel {
    TutorLevel::Novato
}

fn default_modality() -> ModalityPreference {
    ModalityPreference::Ambas
}
