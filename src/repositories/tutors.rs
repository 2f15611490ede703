use sqlx::{PgPool, Postgres, QueryBuilder};
use time::Date;

use crate::db::models::{Tutor, TutorWithUser};
use crate::db::types::{ModalityPreference, TutorLevel};

pub(crate) const COLUMNS: &str = "\
    t.id, t.user_id, t.certified_on, t.level, t.years_experience, t.average_rating, \
    t.total_sessions, t.accumulated_hours, t.specialties, t.preferred_modality, t.bio, t.active";

pub(crate) const USER_COLUMNS: &str = "u.rut, u.first_name, u.last_name, u.email, u.campus, u.career";

#[derive(Debug, Default)]
pub(crate) struct TutorSearch<'a> {
    /// Matches first or last name, case-insensitive.
    pub(crate) name: Option<&'a str>,
    pub(crate) specialty: Option<&'a str>,
}

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<Tutor>, sqlx::Error> {
    sqlx::query_as::<_, Tutor>(&format!("SELECT {COLUMNS} FROM tutors t WHERE t.id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn find_by_user_id(
    executor: impl sqlx::PgExecutor<'_>,
    user_id: &str,
) -> Result<Option<Tutor>, sqlx::Error> {
    sqlx::query_as::<_, Tutor>(&format!("SELECT {COLUMNS} FROM tutors t WHERE t.user_id = $1"))
        .bind(user_id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn find_with_user(
    pool: &PgPool,
    id: &str,
) -> Result<Option<TutorWithUser>, sqlx::Error> {
    sqlx::query_as::<_, TutorWithUser>(&format!(
        "SELECT {COLUMNS}, {USER_COLUMNS} FROM tutors t JOIN users u ON u.id = t.user_id \
         WHERE t.id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) struct CreateTutor<'a> {
    pub(crate) id: &'a str,
    pub(crate) user_id: &'a str,
    pub(crate) certified_on: Date,
    pub(crate) level: TutorLevel,
    pub(crate) years_experience: i32,
    pub(crate) specialties: &'a str,
    pub(crate) preferred_modality: ModalityPreference,
    pub(crate) bio: &'a str,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateTutor<'_>,
) -> Result<Tutor, sqlx::Error> {
    sqlx::query_as::<_, Tutor>(
        "INSERT INTO tutors AS t (
            id, user_id, certified_on, level, years_experience, specialties,
            preferred_modality, bio
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
        RETURNING t.id, t.user_id, t.certified_on, t.level, t.years_experience,
            t.average_rating, t.total_sessions, t.accumulated_hours, t.specialties,
            t.preferred_modality, t.bio, t.active",
    )
    .bind(params.id)
    .bind(params.user_id)
    .bind(params.certified_on)
    .bind(params.level)
    .bind(params.years_experience)
    .bind(params.specialties)
    .bind(params.preferred_modality)
    .bind(params.bio)
    .fetch_one(executor)
    .await
}

pub(crate) async fn top_rated(pool: &PgPool, limit: i64) -> Result<Vec<TutorWithUser>, sqlx::Error> {
    sqlx::query_as::<_, TutorWithUser>(&format!(
        "SELECT {COLUMNS}, {USER_COLUMNS} FROM tutors t JOIN users u ON u.id = t.user_id \
         WHERE t.active = TRUE ORDER BY t.average_rating DESC, t.id LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await
}

fn push_search_filters(builder: &mut QueryBuilder<'_, Postgres>, search: &TutorSearch<'_>) {
    builder.push(" WHERE t.active = TRUE");

    if let Some(name) = search.name.map(str::trim).filter(|value| !value.is_empty()) {
        let pattern = format!("%{name}%");
        builder.push(" AND (u.first_name ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR u.last_name ILIKE ");
        builder.push_bind(pattern);
        builder.push(")");
    }

    if let Some(specialty) = search.specialty.map(str::trim).filter(|value| !value.is_empty()) {
        builder.push(" AND t.specialties ILIKE ");
        builder.push_bind(format!("%{specialty}%"));
    }
}

/// Active tutors matching `search`, best rated first. `page` is `(offset, limit)`.
pub(crate) async fn search(
    pool: &PgPool,
    search: &TutorSearch<'_>,
    page: Option<(i64, i64)>,
) -> Result<Vec<TutorWithUser>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(format!(
        "SELECT {COLUMNS}, {USER_COLUMNS} FROM tutors t JOIN users u ON u.id = t.user_id"
    ));
    push_search_filters(&mut builder, search);
    builder.push(" ORDER BY t.average_rating DESC, t.id");

    if let Some((offset, limit)) = page {
        builder.push(" OFFSET ");
        builder.push_bind(offset);
        builder.push(" LIMIT ");
        builder.push_bind(limit);
    }

    builder.build_query_as::<TutorWithUser>().fetch_all(pool).await
}

pub(crate) async fn count_search(
    pool: &PgPool,
    search: &TutorSearch<'_>,
) -> Result<i64, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(
        "SELECT COUNT(*) FROM tutors t JOIN users u ON u.id = t.user_id",
    );
    push_search_filters(&mut builder, search);
    builder.build_query_scalar::<i64>().fetch_one(pool).await
}

pub(crate) async fn count_active(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tutors WHERE active = TRUE")
        .fetch_one(pool)
        .await
}

#[derive(Debug, Default)]
pub(crate) struct UpdateTutor {
    pub(crate) level: Option<TutorLevel>,
    pub(crate) years_experience: Option<i32>,
    pub(crate) specialties: Option<String>,
    pub(crate) preferred_modality: Option<ModalityPreference>,
    pub(crate) bio: Option<String>,
    pub(crate) active: Option<bool>,
}

pub(crate) async fn update(
    pool: &PgPool,
    id: &str,
    params: UpdateTutor,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE tutors SET
            level = COALESCE($1, level),
            years_experience = COALESCE($2, years_experience),
            specialties = COALESCE($3, specialties),
            preferred_modality = COALESCE($4, preferred_modality),
            bio = COALESCE($5, bio),
            active = COALESCE($6, active)
         WHERE id = $7",
    )
    .bind(params.level)
    .bind(params.years_experience)
    .bind(params.specialties)
    .bind(params.preferred_modality)
    .bind(params.bio)
    .bind(params.active)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn set_average_rating(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    average: f64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE tutors SET average_rating = $1 WHERE id = $2")
        .bind(average)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

pub(crate) async fn set_counters(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    total_sessions: i32,
    accumulated_hours: f64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE tutors SET total_sessions = $1, accumulated_hours = $2 WHERE id = $3")
        .bind(total_sessions)
        .bind(accumulated_hours)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Admin tutor listing filters. Includes inactive tutors.
#[derive(Debug, Default)]
pub(crate) struct TutorFilter<'a> {
    pub(crate) level: Option<TutorLevel>,
    pub(crate) min_rating: Option<f64>,
    /// Matches first name, last name, RUT or specialties.
    pub(crate) search: Option<&'a str>,
}

pub(crate) async fn list_filtered(
    pool: &PgPool,
    filter: &TutorFilter<'_>,
) -> Result<Vec<TutorWithUser>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(format!(
        "SELECT {COLUMNS}, {USER_COLUMNS} FROM tutors t JOIN users u ON u.id = t.user_id WHERE TRUE"
    ));

    if let Some(level) = filter.level {
        builder.push(" AND t.level = ");
        builder.push_bind(level);
    }
    if let Some(min_rating) = filter.min_rating {
        builder.push(" AND t.average_rating >= ");
        builder.push_bind(min_rating);
    }
    if let Some(search) = filter.search.map(str::trim).filter(|value| !value.is_empty()) {
        let pattern = format!("%{search}%");
        builder.push(" AND (u.first_name ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR u.last_name ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR u.rut ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR t.specialties ILIKE ");
        builder.push_bind(pattern);
        builder.push(")");
    }
    builder.push(" ORDER BY t.average_rating DESC, t.id");

    builder.build_query_as::<TutorWithUser>().fetch_all(pool).await
}
