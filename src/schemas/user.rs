use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::User;
use crate::db::types::{AccountStatus, Gender};

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct RegisterRequest {
    #[serde(default)]
    #[validate(length(max = 150, message = "username is too long"))]
    pub(crate) username: String,
    #[validate(length(min = 1, message = "first_name must not be empty"))]
    pub(crate) first_name: String,
    #[validate(length(min = 1, message = "last_name must not be empty"))]
    pub(crate) last_name: String,
    #[validate(email(message = "email is not valid"))]
    pub(crate) email: String,
    #[serde(default)]
    #[serde(alias = "genero")]
    pub(crate) gender: Gender,
    pub(crate) rut: String,
    #[serde(default)]
    #[serde(alias = "sede")]
    pub(crate) campus: String,
    #[serde(default)]
    #[serde(alias = "carrera")]
    pub(crate) career: String,
    #[serde(default = "default_semester")]
    #[serde(alias = "semestre_actual")]
    #[validate(range(min = 1, max = 12, message = "current_semester must be between 1 and 12"))]
    pub(crate) current_semester: i32,
    #[serde(default = "default_gpa")]
    #[serde(alias = "promedio_general")]
    #[validate(range(min = 1.0, max = 7.0, message = "gpa must be between 1.0 and 7.0"))]
    pub(crate) gpa: f64,
    #[serde(default)]
    #[serde(alias = "telefono")]
    pub(crate) phone: Option<String>,
    #[serde(default)]
    #[serde(alias = "es_tutor")]
    pub(crate) is_tutor: bool,
    #[serde(default)]
    #[serde(alias = "especialidades")]
    pub(crate) specialties: Option<String>,
    #[serde(default)]
    #[serde(alias = "años_experiencia")]
    #[validate(range(min = 0, message = "years_experience must be non-negative"))]
    pub(crate) years_experience: Option<i32>,
    pub(crate) password1: String,
    pub(crate) password2: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    pub(crate) rut: String,
    pub(crate) password: String,
}

/// Partial account update used by staff and by the REST layer.
#[derive(Debug, Default, Deserialize, Validate)]
pub(crate) struct UserUpdate {
    #[serde(default)]
    #[validate(length(min = 1, message = "first_name must not be empty"))]
    pub(crate) first_name: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "last_name must not be empty"))]
    pub(crate) last_name: Option<String>,
    #[serde(default)]
    #[validate(email(message = "email is not valid"))]
    pub(crate) email: Option<String>,
    #[serde(default)]
    pub(crate) phone: Option<String>,
    #[serde(default)]
    pub(crate) campus: Option<String>,
    #[serde(default)]
    pub(crate) career: Option<String>,
    #[serde(default)]
    #[validate(range(min = 1, max = 12, message = "current_semester must be between 1 and 12"))]
    pub(crate) current_semester: Option<i32>,
    #[serde(default)]
    #[validate(range(min = 1.0, max = 7.0, message = "gpa must be between 1.0 and 7.0"))]
    pub(crate) gpa: Option<f64>,
    #[serde(default)]
    pub(crate) free_tuition: Option<bool>,
    #[serde(default)]
    pub(crate) status: Option<AccountStatus>,
    #[serde(default)]
    pub(crate) is_tutor: Option<bool>,
    #[serde(default)]
    pub(crate) is_staff: Option<bool>,
    #[serde(default)]
    pub(crate) is_active: Option<bool>,
    #[serde(default)]
    pub(crate) password: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct UserResponse {
    pub(crate) id: String,
    pub(crate) rut: String,
    pub(crate) username: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) full_name: String,
    pub(crate) email: String,
    pub(crate) phone: Option<String>,
    pub(crate) gender: Gender,
    pub(crate) campus: String,
    pub(crate) career: String,
    pub(crate) current_semester: i32,
    pub(crate) gpa: f64,
    pub(crate) free_tuition: bool,
    pub(crate) status: AccountStatus,
    pub(crate) is_tutor: bool,
    pub(crate) is_staff: bool,
    pub(crate) is_superuser: bool,
    pub(crate) is_active: bool,
    pub(crate) date_joined: String,
}

impl UserResponse {
    pub(crate) fn from_db(user: User) -> Self {
        let full_name = user.full_name();
        Self {
            id: user.id,
            rut: user.rut,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            full_name,
            email: user.email,
            phone: user.phone,
            gender: user.gender,
            campus: user.campus,
            career: user.career,
            current_semester: user.current_semester,
            gpa: user.gpa,
            free_tuition: user.free_tuition,
            status: user.status,
            is_tutor: user.is_tutor,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
            is_active: user.is_active,
            date_joined: format_primitive(user.date_joined),
        }
    }
}

fn default_semester() -> i32 {
    1
}

fn default_gpa() -> f64 {
    4.0
}
