use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::{Message, MessageWithSender};

const COLUMNS: &str = "m.id, m.session_id, m.sender_id, m.body, m.sent_at";

pub(crate) async fn create(
    pool: &PgPool,
    id: &str,
    session_id: &str,
    sender_id: &str,
    body: &str,
    sent_at: PrimitiveDateTime,
) -> Result<Message, sqlx::Error> {
    sqlx::query_as::<_, Message>(&format!(
        "INSERT INTO messages AS m (id, session_id, sender_id, body, sent_at)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(session_id)
    .bind(sender_id)
    .bind(body)
    .bind(sent_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Message>, sqlx::Error> {
    sqlx::query_as::<_, Message>(&format!("SELECT {COLUMNS} FROM messages m WHERE m.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Conversation of a session, oldest first.
pub(crate) async fn list_for_session(
    pool: &PgPool,
    session_id: &str,
) -> Result<Vec<MessageWithSender>, sqlx::Error> {
    sqlx::query_as::<_, MessageWithSender>(&format!(
        "SELECT {COLUMNS}, CONCAT_WS(' ', u.first_name, u.last_name) AS sender_name
         FROM messages m JOIN users u ON u.id = m.sender_id
         WHERE m.session_id = $1
         ORDER BY m.sent_at ASC, m.id"
    ))
    .bind(session_id)
    .fetch_all(pool)
    .await
}

/// Messages of sessions `user_id` takes part in, or all when `None`.
pub(crate) async fn list_page_for_participant(
    pool: &PgPool,
    user_id: Option<&str>,
    offset: i64,
    limit: i64,
) -> Result<Vec<Message>, sqlx::Error> {
    sqlx::query_as::<_, Message>(&format!(
        "SELECT {COLUMNS} FROM messages m
         JOIN tutoring_sessions s ON s.id = m.session_id
         JOIN tutors t ON t.id = s.tutor_id
         WHERE $1::TEXT IS NULL OR s.student_id = $1 OR t.user_id = $1
         ORDER BY m.sent_at ASC, m.id OFFSET $2 LIMIT $3"
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
        "SELECT COUNT(*) FROM messages m
         JOIN tutoring_sessions s ON s.id = m.session_id
         JOIN tutors t ON t.id = s.tutor_id
         WHERE $1::TEXT IS NULL OR s.student_id = $1 OR t.user_id = $1",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
}

pub(crate) async fn update_body(
    pool: &PgPool,
    id: &str,
    body: &str,
) -> Result<Option<Message>, sqlx::Error> {
    sqlx::query_as::<_, Message>(&format!(
        "UPDATE messages AS m SET body = $1 WHERE m.id = $2 RETURNING {COLUMNS}"
    ))
    .bind(body)
    .bind(id)
    .fetch_optional(pool)
    .await
}
