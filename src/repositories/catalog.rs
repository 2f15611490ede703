use sqlx::PgPool;

use crate::db::models::{Campus, Career, Subject};

const SUBJECT_COLUMNS: &str = "id, name, code, career_id, semester, is_critical, active";

pub(crate) async fn list_active_subjects(pool: &PgPool) -> Result<Vec<Subject>, sqlx::Error> {
    sqlx::query_as::<_, Subject>(&format!(
        "SELECT {SUBJECT_COLUMNS} FROM subjects WHERE active = TRUE ORDER BY name"
    ))
    .fetch_all(pool)
    .await
}

pub(crate) async fn find_subject(pool: &PgPool, id: &str) -> Result<Option<Subject>, sqlx::Error> {
    sqlx::query_as::<_, Subject>(&format!("SELECT {SUBJECT_COLUMNS} FROM subjects WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_active_campuses(pool: &PgPool) -> Result<Vec<Campus>, sqlx::Error> {
    sqlx::query_as::<_, Campus>(
        "SELECT id, name, city, region, address, phone, email, active \
         FROM campuses WHERE active = TRUE ORDER BY name",
    )
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_active_careers(pool: &PgPool) -> Result<Vec<Career>, sqlx::Error> {
    sqlx::query_as::<_, Career>(
        "SELECT id, name, code, area, level, duration_semesters, active \
         FROM careers WHERE active = TRUE ORDER BY name",
    )
    .fetch_all(pool)
    .await
}
