use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::AuthSession;

const COLUMNS: &str = "id, user_id, last_activity, created_at, expires_at";

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    user_id: &str,
    now: PrimitiveDateTime,
    expires_at: PrimitiveDateTime,
) -> Result<AuthSession, sqlx::Error> {
    sqlx::query_as::<_, AuthSession>(&format!(
        "INSERT INTO auth_sessions (id, user_id, last_activity, created_at, expires_at)
         VALUES ($1, $2, $3, $3, $4)
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(user_id)
    .bind(now)
    .bind(expires_at)
    .fetch_one(executor)
    .await
}

/// Returns the session only while it has not expired.
pub(crate) async fn find_live(
    pool: &PgPool,
    id: &str,
    now: PrimitiveDateTime,
) -> Result<Option<AuthSession>, sqlx::Error> {
    sqlx::query_as::<_, AuthSession>(&format!(
        "SELECT {COLUMNS} FROM auth_sessions WHERE id = $1 AND expires_at > $2"
    ))
    .bind(id)
    .bind(now)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn touch(
    pool: &PgPool,
    id: &str,
    now: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE auth_sessions SET last_activity = $1 WHERE id = $2")
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM auth_sessions WHERE id = $1").bind(id).execute(pool).await?;
    Ok(())
}

pub(crate) async fn delete_expired(
    pool: &PgPool,
    now: PrimitiveDateTime,
) -> Result<u64, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM auth_sessions WHERE expires_at <= $1").bind(now).execute(pool).await?;
    Ok(result.rows_affected())
}
