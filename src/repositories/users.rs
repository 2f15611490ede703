use sqlx::{PgPool, Postgres, QueryBuilder};
use time::{Date, PrimitiveDateTime};

use crate::db::models::User;
use crate::db::types::{AccountStatus, Gender};

pub(crate) const COLUMNS: &str = "\
    id, rut, username, hashed_password, first_name, last_name, email, phone, birth_date, \
    gender, campus, career, current_semester, gpa, free_tuition, status, enrolled_on, \
    is_tutor, is_staff, is_superuser, is_active, active_session_id, date_joined, updated_at";

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn find_by_rut(pool: &PgPool, rut: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE rut = $1"))
        .bind(rut)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn exists_by_rut_or_username(
    pool: &PgPool,
    rut: &str,
    username: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT id FROM users WHERE rut = $1 OR username = $2 LIMIT 1")
        .bind(rut)
        .bind(username)
        .fetch_optional(pool)
        .await
}

pub(crate) struct CreateUser<'a> {
    pub(crate) id: &'a str,
    pub(crate) rut: &'a str,
    pub(crate) username: &'a str,
    pub(crate) hashed_password: String,
    pub(crate) first_name: &'a str,
    pub(crate) last_name: &'a str,
    pub(crate) email: &'a str,
    pub(crate) phone: Option<&'a str>,
    pub(crate) birth_date: Option<Date>,
    pub(crate) gender: Gender,
    pub(crate) campus: &'a str,
    pub(crate) career: &'a str,
    pub(crate) current_semester: i32,
    pub(crate) gpa: f64,
    pub(crate) is_tutor: bool,
    pub(crate) is_staff: bool,
    pub(crate) is_superuser: bool,
    pub(crate) now: PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateUser<'_>,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (
            id, rut, username, hashed_password, first_name, last_name, email, phone,
            birth_date, gender, campus, career, current_semester, gpa, is_tutor,
            is_staff, is_superuser, is_active, date_joined, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17,TRUE,$18,$18)
        RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.rut)
    .bind(params.username)
    .bind(params.hashed_password)
    .bind(params.first_name)
    .bind(params.last_name)
    .bind(params.email)
    .bind(params.phone)
    .bind(params.birth_date)
    .bind(params.gender)
    .bind(params.campus)
    .bind(params.career)
    .bind(params.current_semester)
    .bind(params.gpa)
    .bind(params.is_tutor)
    .bind(params.is_staff)
    .bind(params.is_superuser)
    .bind(params.now)
    .fetch_one(executor)
    .await
}

#[derive(Debug, Default)]
pub(crate) struct UpdateUser {
    pub(crate) first_name: Option<String>,
    pub(crate) last_name: Option<String>,
    pub(crate) email: Option<String>,
    pub(crate) phone: Option<String>,
    pub(crate) campus: Option<String>,
    pub(crate) career: Option<String>,
    pub(crate) current_semester: Option<i32>,
    pub(crate) gpa: Option<f64>,
    pub(crate) free_tuition: Option<bool>,
    pub(crate) status: Option<AccountStatus>,
    pub(crate) is_tutor: Option<bool>,
    pub(crate) is_staff: Option<bool>,
    pub(crate) is_superuser: Option<bool>,
    pub(crate) is_active: Option<bool>,
    pub(crate) hashed_password: Option<String>,
}

pub(crate) async fn update(
    pool: &PgPool,
    id: &str,
    params: UpdateUser,
    now: PrimitiveDateTime,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET
            first_name = COALESCE($1, first_name),
            last_name = COALESCE($2, last_name),
            email = COALESCE($3, email),
            phone = COALESCE($4, phone),
            campus = COALESCE($5, campus),
            career = COALESCE($6, career),
            current_semester = COALESCE($7, current_semester),
            gpa = COALESCE($8, gpa),
            free_tuition = COALESCE($9, free_tuition),
            status = COALESCE($10, status),
            is_tutor = COALESCE($11, is_tutor),
            is_staff = COALESCE($12, is_staff),
            is_superuser = COALESCE($13, is_superuser),
            is_active = COALESCE($14, is_active),
            hashed_password = COALESCE($15, hashed_password),
            updated_at = $16
         WHERE id = $17
         RETURNING {COLUMNS}"
    ))
    .bind(params.first_name)
    .bind(params.last_name)
    .bind(params.email)
    .bind(params.phone)
    .bind(params.campus)
    .bind(params.career)
    .bind(params.current_semester)
    .bind(params.gpa)
    .bind(params.free_tuition)
    .bind(params.status)
    .bind(params.is_tutor)
    .bind(params.is_staff)
    .bind(params.is_superuser)
    .bind(params.is_active)
    .bind(params.hashed_password)
    .bind(now)
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Records `session_id` as the only session allowed to act for the account.
pub(crate) async fn set_active_session(
    executor: impl sqlx::PgExecutor<'_>,
    user_id: &str,
    session_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET active_session_id = $1 WHERE id = $2")
        .bind(session_id)
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Claims ownership only when no session holds it yet.
pub(crate) async fn claim_active_session(
    pool: &PgPool,
    user_id: &str,
    session_id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE users SET active_session_id = $1 WHERE id = $2 AND active_session_id IS NULL",
    )
    .bind(session_id)
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn deactivate(
    pool: &PgPool,
    id: &str,
    now: PrimitiveDateTime,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("UPDATE users SET is_active = FALSE, updated_at = $1 WHERE id = $2")
            .bind(now)
            .bind(id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn list_page(
    pool: &PgPool,
    offset: i64,
    limit: i64,
) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {COLUMNS} FROM users ORDER BY date_joined DESC, id OFFSET $1 LIMIT $2"
    ))
    .bind(offset)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub(crate) async fn count_all(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users").fetch_one(pool).await
}

pub(crate) async fn count_by_tutor_flag(pool: &PgPool, is_tutor: bool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE is_tutor = $1")
        .bind(is_tutor)
        .fetch_one(pool)
        .await
}

pub(crate) async fn distinct_campuses(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT campus FROM users WHERE campus <> '' ORDER BY campus",
    )
    .fetch_all(pool)
    .await
}

pub(crate) async fn distinct_careers(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT career FROM users WHERE career <> '' ORDER BY career",
    )
    .fetch_all(pool)
    .await
}

/// Admin user listing filters. Empty strings mean "no filter".
#[derive(Debug, Default)]
pub(crate) struct UserFilter<'a> {
    pub(crate) is_tutor: Option<bool>,
    pub(crate) campus: Option<&'a str>,
    pub(crate) career: Option<&'a str>,
    pub(crate) status: Option<AccountStatus>,
    /// Matches RUT, first name, last name or email.
    pub(crate) search: Option<&'a str>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

pub(crate) async fn list_filtered(
    pool: &PgPool,
    filter: &UserFilter<'_>,
) -> Result<Vec<User>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM users WHERE TRUE"));

    if let Some(is_tutor) = filter.is_tutor {
        builder.push(" AND is_tutor = ");
        builder.push_bind(is_tutor);
    }
    if let Some(campus) = non_empty(filter.campus) {
        builder.push(" AND campus = ");
        builder.push_bind(campus.to_string());
    }
    if let Some(career) = non_empty(filter.career) {
        builder.push(" AND career = ");
        builder.push_bind(career.to_string());
    }
    if let Some(status) = filter.status {
        builder.push(" AND status = ");
        builder.push_bind(status);
    }
    if let Some(search) = non_empty(filter.search) {
        let pattern = format!("%{search}%");
        builder.push(" AND (rut ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR first_name ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR last_name ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR email ILIKE ");
        builder.push_bind(pattern);
        builder.push(")");
    }
    builder.push(" ORDER BY date_joined DESC, id");

    builder.build_query_as::<User>().fetch_all(pool).await
}
