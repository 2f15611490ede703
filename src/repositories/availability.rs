use sqlx::{PgPool, Postgres, Transaction};
use time::Time;
use uuid::Uuid;

use crate::db::models::AvailabilitySlot;
use crate::db::types::DayOfWeek;

const COLUMNS: &str = "id, tutor_id, day, start_time, end_time, active";

pub(crate) async fn list_active_for_tutor(
    pool: &PgPool,
    tutor_id: &str,
) -> Result<Vec<AvailabilitySlot>, sqlx::Error> {
    sqlx::query_as::<_, AvailabilitySlot>(&format!(
        "SELECT {COLUMNS} FROM availability_slots \
         WHERE tutor_id = $1 AND active = TRUE ORDER BY day, start_time"
    ))
    .bind(tutor_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn find_active_slot(
    pool: &PgPool,
    tutor_id: &str,
    day: DayOfWeek,
    start_time: Time,
) -> Result<Option<AvailabilitySlot>, sqlx::Error> {
    sqlx::query_as::<_, AvailabilitySlot>(&format!(
        "SELECT {COLUMNS} FROM availability_slots \
         WHERE tutor_id = $1 AND day = $2 AND start_time = $3 AND active = TRUE"
    ))
    .bind(tutor_id)
    .bind(day)
    .bind(start_time)
    .fetch_optional(pool)
    .await
}

/// Deletes every slot of the tutor and inserts `slots` as `(day, start, end)`.
pub(crate) async fn replace_all(
    tx: &mut Transaction<'_, Postgres>,
    tutor_id: &str,
    slots: &[(DayOfWeek, Time, Time)],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM availability_slots WHERE tutor_id = $1")
        .bind(tutor_id)
        .execute(&mut **tx)
        .await?;

    for (day, start_time, end_time) in slots {
        sqlx::query(
            "INSERT INTO availability_slots (id, tutor_id, day, start_time, end_time, active)
             VALUES ($1, $2, $3, $4, $5, TRUE)
             ON CONFLICT (tutor_id, day, start_time) DO NOTHING",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(tutor_id)
        .bind(day)
        .bind(start_time)
        .bind(end_time)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}
