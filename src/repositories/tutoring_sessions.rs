use sqlx::{PgPool, Postgres, QueryBuilder};
use time::PrimitiveDateTime;

use crate::db::models::{SessionOverview, TutoringSession};
use crate::db::types::{SessionModality, TutoringStatus};

pub(crate) const COLUMNS: &str = "\
    s.id, s.tutor_id, s.student_id, s.subject_id, s.modality, s.scheduled_at, \
    s.duration_minutes, s.status, s.topic, s.tutor_notes, s.tutor_rating, s.student_rating, \
    s.started_at, s.ended_at, s.rejection_reason, s.created_at";

/// Base select for [`SessionOverview`]. Aliases: `s` session, `t` tutor profile,
/// `tu` tutor account, `st` student account, `sub` subject.
pub(crate) const OVERVIEW_SELECT: &str = "\
    SELECT s.id, s.tutor_id, s.student_id, s.subject_id, s.modality, s.scheduled_at, \
        s.duration_minutes, s.status, s.topic, s.tutor_notes, s.tutor_rating, s.student_rating, \
        s.started_at, s.ended_at, s.rejection_reason, s.created_at, \
        tu.id AS tutor_user_id, \
        CONCAT_WS(' ', tu.first_name, tu.last_name) AS tutor_name, \
        CONCAT_WS(' ', st.first_name, st.last_name) AS student_name, \
        st.rut AS student_rut, \
        sub.name AS subject_name \
    FROM tutoring_sessions s \
    JOIN tutors t ON t.id = s.tutor_id \
    JOIN users tu ON tu.id = t.user_id \
    JOIN users st ON st.id = s.student_id \
    JOIN subjects sub ON sub.id = s.subject_id";

pub(crate) struct CreateSession<'a> {
    pub(crate) id: &'a str,
    pub(crate) tutor_id: &'a str,
    pub(crate) student_id: &'a str,
    pub(crate) subject_id: &'a str,
    pub(crate) modality: SessionModality,
    pub(crate) scheduled_at: PrimitiveDateTime,
    pub(crate) duration_minutes: i32,
    pub(crate) topic: &'a str,
    pub(crate) created_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateSession<'_>,
) -> Result<TutoringSession, sqlx::Error> {
    sqlx::query_as::<_, TutoringSession>(&format!(
        "INSERT INTO tutoring_sessions AS s (
            id, tutor_id, student_id, subject_id, modality, scheduled_at,
            duration_minutes, status, topic, created_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10)
        RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.tutor_id)
    .bind(params.student_id)
    .bind(params.subject_id)
    .bind(params.modality)
    .bind(params.scheduled_at)
    .bind(params.duration_minutes)
    .bind(TutoringStatus::Pending)
    .bind(params.topic)
    .bind(params.created_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<TutoringSession>, sqlx::Error> {
    sqlx::query_as::<_, TutoringSession>(&format!(
        "SELECT {COLUMNS} FROM tutoring_sessions s WHERE s.id = $1"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn find_overview(
    pool: &PgPool,
    id: &str,
) -> Result<Option<SessionOverview>, sqlx::Error> {
    sqlx::query_as::<_, SessionOverview>(&format!("{OVERVIEW_SELECT} WHERE s.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Order {
    SoonestFirst,
    LatestFirst,
}

/// Filter shared by the dashboard, the session lists and the counters.
#[derive(Debug, Default)]
pub(crate) struct SessionFilter<'a> {
    pub(crate) tutor_id: Option<&'a str>,
    pub(crate) student_id: Option<&'a str>,
    pub(crate) statuses: &'a [TutoringStatus],
    pub(crate) scheduled_from: Option<PrimitiveDateTime>,
    pub(crate) scheduled_before: Option<PrimitiveDateTime>,
    pub(crate) student_rating_missing: bool,
    /// Matches tutor name, student name or RUT, subject name, or topic.
    pub(crate) search: Option<&'a str>,
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &SessionFilter<'_>) {
    builder.push(" WHERE TRUE");

    if let Some(tutor_id) = filter.tutor_id {
        builder.push(" AND s.tutor_id = ");
        builder.push_bind(tutor_id.to_string());
    }
    if let Some(student_id) = filter.student_id {
        builder.push(" AND s.student_id = ");
        builder.push_bind(student_id.to_string());
    }
    if !filter.statuses.is_empty() {
        builder.push(" AND s.status IN (");
        let mut separated = builder.separated(", ");
        for status in filter.statuses {
            separated.push_bind(*status);
        }
        separated.push_unseparated(")");
    }
    if let Some(from) = filter.scheduled_from {
        builder.push(" AND s.scheduled_at >= ");
        builder.push_bind(from);
    }
    if let Some(before) = filter.scheduled_before {
        builder.push(" AND s.scheduled_at < ");
        builder.push_bind(before);
    }
    if filter.student_rating_missing {
        builder.push(" AND s.student_rating IS NULL");
    }
    if let Some(search) = filter.search.map(str::trim).filter(|value| !value.is_empty()) {
        let pattern = format!("%{search}%");
        builder.push(" AND (tu.first_name ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR tu.last_name ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR st.first_name ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR st.last_name ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR st.rut ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR sub.name ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR s.topic ILIKE ");
        builder.push_bind(pattern);
        builder.push(")");
    }
}

pub(crate) async fn list_overviews(
    pool: &PgPool,
    filter: &SessionFilter<'_>,
    order: Order,
    limit: Option<i64>,
) -> Result<Vec<SessionOverview>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(OVERVIEW_SELECT);
    push_filter(&mut builder, filter);
    builder.push(match order {
        Order::SoonestFirst => " ORDER BY s.scheduled_at ASC, s.id",
        Order::LatestFirst => " ORDER BY s.scheduled_at DESC, s.id",
    });
    if let Some(limit) = limit {
        builder.push(" LIMIT ");
        builder.push_bind(limit);
    }

    builder.build_query_as::<SessionOverview>().fetch_all(pool).await
}

pub(crate) async fn count(pool: &PgPool, filter: &SessionFilter<'_>) -> Result<i64, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(
        "SELECT COUNT(*) FROM tutoring_sessions s \
         JOIN tutors t ON t.id = s.tutor_id \
         JOIN users tu ON tu.id = t.user_id \
         JOIN users st ON st.id = s.student_id \
         JOIN subjects sub ON sub.id = s.subject_id",
    );
    push_filter(&mut builder, filter);
    builder.build_query_scalar::<i64>().fetch_one(pool).await
}

/// Moves a session to `to` only if it is currently in one of `from`.
pub(crate) struct Transition<'a> {
    pub(crate) id: &'a str,
    pub(crate) from: &'a [TutoringStatus],
    pub(crate) to: TutoringStatus,
    pub(crate) rejection_reason: Option<&'a str>,
    pub(crate) ended_at: Option<PrimitiveDateTime>,
}

pub(crate) async fn transition(
    executor: impl sqlx::PgExecutor<'_>,
    params: Transition<'_>,
) -> Result<Option<TutoringSession>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new("UPDATE tutoring_sessions AS s SET status = ");
    builder.push_bind(params.to);
    builder.push(", rejection_reason = COALESCE(");
    builder.push_bind(params.rejection_reason.map(str::to_string));
    builder.push(", s.rejection_reason), ended_at = COALESCE(");
    builder.push_bind(params.ended_at);
    builder.push(", s.ended_at) WHERE s.id = ");
    builder.push_bind(params.id.to_string());
    builder.push(" AND s.status IN (");
    let mut separated = builder.separated(", ");
    for status in params.from {
        separated.push_bind(*status);
    }
    separated.push_unseparated(")");
    builder.push(" RETURNING ");
    builder.push(COLUMNS);

    builder.build_query_as::<TutoringSession>().fetch_optional(executor).await
}

/// Stores the student's rating of the tutor once. Returns false when the
/// session is not completed or was already rated.
pub(crate) async fn set_tutor_rating(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    rating: i32,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE tutoring_sessions SET tutor_rating = $1
         WHERE id = $2 AND status = $3 AND tutor_rating IS NULL",
    )
    .bind(rating)
    .bind(id)
    .bind(TutoringStatus::Completed)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Stores the tutor's rating of the student once.
pub(crate) async fn set_student_rating(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    rating: i32,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE tutoring_sessions SET student_rating = $1
         WHERE id = $2 AND status = $3 AND student_rating IS NULL",
    )
    .bind(rating)
    .bind(id)
    .bind(TutoringStatus::Completed)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Mean of every recorded tutor rating, `None` when nothing is rated yet.
pub(crate) async fn average_tutor_rating(
    executor: impl sqlx::PgExecutor<'_>,
    tutor_id: &str,
) -> Result<Option<f64>, sqlx::Error> {
    sqlx::query_scalar::<_, Option<f64>>(
        "SELECT AVG(tutor_rating)::DOUBLE PRECISION FROM tutoring_sessions
         WHERE tutor_id = $1 AND tutor_rating IS NOT NULL",
    )
    .bind(tutor_id)
    .fetch_one(executor)
    .await
}

/// `(completed sessions, completed minutes)` for a tutor.
pub(crate) async fn completed_totals(
    executor: impl sqlx::PgExecutor<'_>,
    tutor_id: &str,
) -> Result<(i64, i64), sqlx::Error> {
    sqlx::query_as::<_, (i64, i64)>(
        "SELECT COUNT(*), COALESCE(SUM(duration_minutes), 0)::BIGINT FROM tutoring_sessions
         WHERE tutor_id = $1 AND status = $2",
    )
    .bind(tutor_id)
    .bind(TutoringStatus::Completed)
    .fetch_one(executor)
    .await
}

pub(crate) async fn count_by_status(
    pool: &PgPool,
    status: TutoringStatus,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tutoring_sessions WHERE status = $1")
        .bind(status)
        .fetch_one(pool)
        .await
}

pub(crate) async fn count_all(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tutoring_sessions").fetch_one(pool).await
}

/// Sessions where `user_id` takes part, or every session when `None`.
pub(crate) async fn list_page_for_participant(
    pool: &PgPool,
    user_id: Option<&str>,
    offset: i64,
    limit: i64,
) -> Result<Vec<TutoringSession>, sqlx::Error> {
    sqlx::query_as::<_, TutoringSession>(&format!(
        "SELECT {COLUMNS} FROM tutoring_sessions s JOIN tutors t ON t.id = s.tutor_id
         WHERE $1::TEXT IS NULL OR s.student_id = $1 OR t.user_id = $1
         ORDER BY s.scheduled_at DESC, s.id OFFSET $2 LIMIT $3"
    ))
    .bind(user_id)
    .bind(offset)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub(crate) async fn count_for_participant(
    pool: &PgPool,
    user_id: Option<&str>,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM tutoring_sessions s JOIN tutors t ON t.id = s.tutor_id
         WHERE $1::TEXT IS NULL OR s.student_id = $1 OR t.user_id = $1",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
}

pub(crate) async fn list_for_tutor(
    pool: &PgPool,
    tutor_id: &str,
) -> Result<Vec<TutoringSession>, sqlx::Error> {
    sqlx::query_as::<_, TutoringSession>(&format!(
        "SELECT {COLUMNS} FROM tutoring_sessions s WHERE s.tutor_id = $1
         ORDER BY s.scheduled_at DESC, s.id"
    ))
    .bind(tutor_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn update_details(
    pool: &PgPool,
    id: &str,
    topic: Option<&str>,
    tutor_notes: Option<&str>,
    modality: Option<SessionModality>,
) -> Result<Option<TutoringSession>, sqlx::Error> {
    sqlx::query_as::<_, TutoringSession>(&format!(
        "UPDATE tutoring_sessions AS s SET
            topic = COALESCE($1, s.topic),
            tutor_notes = COALESCE($2, s.tutor_notes),
            modality = COALESCE($3, s.modality)
         WHERE s.id = $4
         RETURNING {COLUMNS}"
    ))
    .bind(topic)
    .bind(tutor_notes)
    .bind(modality)
    .bind(id)
    .fetch_optional(pool)
    .await
}
