use anyhow::{Context, Result};
use sqlx::{PgPool, Postgres, Transaction};

use crate::repositories;

/// Recomputes the stored average from every rated session of the tutor.
/// Keeps the previous value when no session carries a rating.
pub(crate) async fn recompute_average(
    tx: &mut Transaction<'_, Postgres>,
    tutor_id: &str,
) -> Result<Option<f64>> {
    let average = repositories::tutoring_sessions::average_tutor_rating(&mut **tx, tutor_id)
        .await
        .context("Failed to compute tutor average rating")?;

    if let Some(average) = average {
        repositories::tutors::set_average_rating(&mut **tx, tutor_id, round_rating(average))
            .await
            .context("Failed to store tutor average rating")?;
    }

    Ok(average)
}

/// Refreshes `total_sessions` and `accumulated_hours` from completed sessions.
pub(crate) async fn recompute_counters(
    tx: &mut Transaction<'_, Postgres>,
    tutor_id: &str,
) -> Result<()> {
    let (completed, minutes) = repositories::tutoring_sessions::completed_totals(&mut **tx, tutor_id)
        .await
        .context("Failed to count completed sessions")?;

    let total_sessions = i32::try_from(completed).unwrap_or(i32::MAX);
    let hours = ((minutes as f64 / 60.0) * 100.0).round() / 100.0;
    repositories::tutors::set_counters(&mut **tx, tutor_id, total_sessions, hours)
        .await
        .context("Failed to store tutor counters")?;
    Ok(())
}

/// Stores the student's rating of the tutor and refreshes the tutor average in
/// one transaction. Returns false when the session cannot be rated.
pub(crate) async fn record_tutor_rating(
    pool: &PgPool,
    session_id: &str,
    tutor_id: &str,
    rating: i32,
) -> Result<bool> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let stored = repositories::tutoring_sessions::set_tutor_rating(&mut *tx, session_id, rating)
        .await
        .context("Failed to store tutor rating")?;
    if !stored {
        tx.rollback().await.context("Failed to rollback transaction")?;
        return Ok(false);
    }

    let average = recompute_average(&mut tx, tutor_id).await?;
    tx.commit().await.context("Failed to commit rating")?;

    tracing::info!(
        session_id = %session_id,
        tutor_id = %tutor_id,
        rating,
        average = ?average,
        action = "tutor_rated",
        "Tutor rating recorded"
    );
    Ok(true)
}

/// NUMERIC(3,2) semantics for the stored average.
fn round_rating(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_are_kept_to_two_decimals() {
        assert_eq!(round_rating(4.333_333), 4.33);
        assert_eq!(round_rating(3.666_666), 3.67);
        assert_eq!(round_rating(5.0), 5.0);
    }
}
