use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "gender")]
pub(crate) enum Gender {
    Masculino,
    Femenino,
    Otro,
    #[default]
    #[serde(rename = "Prefiero_no_decir")]
    #[sqlx(rename = "Prefiero_no_decir")]
    PreferNotToSay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "accountstatus")]
pub(crate) enum AccountStatus {
    #[serde(rename = "Activo")]
    #[sqlx(rename = "Activo")]
    Active,
    #[serde(rename = "Egresado")]
    #[sqlx(rename = "Egresado")]
    Graduated,
    #[serde(rename = "Retirado")]
    #[sqlx(rename = "Retirado")]
    Withdrawn,
    #[serde(rename = "Suspendido")]
    #[sqlx(rename = "Suspendido")]
    Suspended,
}

impl AccountStatus {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Activo",
            Self::Graduated => "Egresado",
            Self::Withdrawn => "Retirado",
            Self::Suspended => "Suspendido",
        }
    }

    pub(crate) fn from_label(value: &str) -> Option<Self> {
        [Self::Active, Self::Graduated, Self::Withdrawn, Self::Suspended]
            .into_iter()
            .find(|status| status.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Type)]
#[sqlx(type_name = "tutorlevel")]
pub(crate) enum TutorLevel {
    Novato,
    Principiante,
    Intermedio,
    Avanzado,
    Erudito,
    Iluminado,
}

impl TutorLevel {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Novato => "Novato",
            Self::Principiante => "Principiante",
            Self::Intermedio => "Intermedio",
            Self::Avanzado => "Avanzado",
            Self::Erudito => "Erudito",
            Self::Iluminado => "Iluminado",
        }
    }

    pub(crate) fn from_label(value: &str) -> Option<Self> {
        [
            Self::Novato,
            Self::Principiante,
            Self::Intermedio,
            Self::Avanzado,
            Self::Erudito,
            Self::Iluminado,
        ]
        .into_iter()
        .find(|level| level.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "modalitypreference")]
pub(crate) enum ModalityPreference {
    Presencial,
    Online,
    Ambas,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "sessionmodality")]
pub(crate) enum SessionModality {
    Presencial,
    Online,
}

/// Weekday of a recurring availability slot, Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Type)]
#[sqlx(type_name = "weekday")]
pub(crate) enum DayOfWeek {
    #[serde(rename = "Lunes")]
    #[sqlx(rename = "Lunes")]
    Monday,
    #[serde(rename = "Martes")]
    #[sqlx(rename = "Martes")]
    Tuesday,
    #[serde(rename = "Miércoles")]
    #[sqlx(rename = "Miércoles")]
    Wednesday,
    #[serde(rename = "Jueves")]
    #[sqlx(rename = "Jueves")]
    Thursday,
    #[serde(rename = "Viernes")]
    #[sqlx(rename = "Viernes")]
    Friday,
    #[serde(rename = "Sábado")]
    #[sqlx(rename = "Sábado")]
    Saturday,
    #[serde(rename = "Domingo")]
    #[sqlx(rename = "Domingo")]
    Sunday,
}

impl DayOfWeek {
    pub(crate) const ALL: [DayOfWeek; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Monday => "Lunes",
            Self::Tuesday => "Martes",
            Self::Wednesday => "Miércoles",
            Self::Thursday => "Jueves",
            Self::Friday => "Viernes",
            Self::Saturday => "Sábado",
            Self::Sunday => "Domingo",
        }
    }

    pub(crate) fn from_label(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|day| day.label() == value)
    }

    /// Monday = 0 through Sunday = 6.
    pub(crate) fn index(self) -> u8 {
        match self {
            Self::Monday => 0,
            Self::Tuesday => 1,
            Self::Wednesday => 2,
            Self::Thursday => 3,
            Self::Friday => 4,
            Self::Saturday => 5,
            Self::Sunday => 6,
        }
    }
}

impl From<time::Weekday> for DayOfWeek {
    fn from(value: time::Weekday) -> Self {
        match value {
            time::Weekday::Monday => Self::Monday,
            time::Weekday::Tuesday => Self::Tuesday,
            time::Weekday::Wednesday => Self::Wednesday,
            time::Weekday::Thursday => Self::Thursday,
            time::Weekday::Friday => Self::Friday,
            time::Weekday::Saturday => Self::Saturday,
            time::Weekday::Sunday => Self::Sunday,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "tutoringstatus")]
pub(crate) enum TutoringStatus {
    #[serde(rename = "Pendiente")]
    #[sqlx(rename = "Pendiente")]
    Pending,
    #[serde(rename = "Aceptada")]
    #[sqlx(rename = "Aceptada")]
    Accepted,
    #[serde(rename = "Denegada")]
    #[sqlx(rename = "Denegada")]
    Denied,
    #[serde(rename = "Completada")]
    #[sqlx(rename = "Completada")]
    Completed,
    #[serde(rename = "Cancelada")]
    #[sqlx(rename = "Cancelada")]
    Cancelled,
    #[serde(rename = "No_Show")]
    #[sqlx(rename = "No_Show")]
    NoShow,
}

impl TutoringStatus {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pendiente",
            Self::Accepted => "Aceptada",
            Self::Denied => "Denegada",
            Self::Completed => "Completada",
            Self::Cancelled => "Cancelada",
            Self::NoShow => "No_Show",
        }
    }

    /// Parses the wire name used by admin filters.
    pub(crate) fn from_label(value: &str) -> Option<Self> {
        [
            Self::Pending,
            Self::Accepted,
            Self::Denied,
            Self::Completed,
            Self::Cancelled,
            Self::NoShow,
        ]
        .into_iter()
        .find(|status| status.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "resourcekind")]
pub(crate) enum ResourceKind {
    Guia,
    Ejercicios,
    Video,
    Presentacion,
    Documento,
    Otro,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "achievementcategory")]
pub(crate) enum AchievementCategory {
    Sesiones,
    Calidad,
    Tiempo,
    Especialidad,
    Comunidad,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "careerarea")]
pub(crate) enum CareerArea {
    Tecnologia,
    Administracion,
    Construccion,
    Salud,
    Gastronomia,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "notificationkind")]
pub(crate) enum NotificationKind {
    #[serde(rename = "Sesion_Agendada")]
    #[sqlx(rename = "Sesion_Agendada")]
    SessionBooked,
    #[serde(rename = "Sesion_Aceptada")]
    #[sqlx(rename = "Sesion_Aceptada")]
    SessionAccepted,
    #[serde(rename = "Sesion_Rechazada")]
    #[sqlx(rename = "Sesion_Rechazada")]
    SessionDenied,
    #[serde(rename = "Recordatorio")]
    #[sqlx(rename = "Recordatorio")]
    Reminder,
    #[serde(rename = "Cancelacion")]
    #[sqlx(rename = "Cancelacion")]
    Cancellation,
    #[serde(rename = "Evaluacion")]
    #[sqlx(rename = "Evaluacion")]
    Evaluation,
    #[serde(rename = "Logro")]
    #[sqlx(rename = "Logro")]
    Achievement,
    #[serde(rename = "Sistema")]
    #[sqlx(rename = "Sistema")]
    System,
}
