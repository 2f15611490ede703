use anyhow::{Context, Result};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::core::time::primitive_now_utc;
use crate::db::models::User;
use crate::db::types::AchievementCategory;
use crate::repositories;
use crate::repositories::achievements::NewAchievement;
use crate::services::notifications;

const PROPHETIC_NAME: &str = "En busca de habilidades proféticas";
const PROPHETIC_DESCRIPTION: &str =
    "Has iniciado una sesión con el tutor Nostradamus, ¡comienza tu viaje hacia la iluminación!";
const PROPHET_FIRST_NAME: &str = "Como un Gran Pensador";
const PROPHET_LAST_NAME: &str = "Nostradamus";

pub(crate) fn is_prophet(tutor_user: &User) -> bool {
    tutor_user.first_name == PROPHET_FIRST_NAME && tutor_user.last_name == PROPHET_LAST_NAME
}

/// Awards the booking achievement tied to `tutor_user`, if any. Returns the
/// name of a newly granted achievement.
pub(crate) async fn award_for_booking(
    tx: &mut Transaction<'_, Postgres>,
    student_id: &str,
    tutor_user: &User,
) -> Result<Option<&'static str>> {
    if !is_prophet(tutor_user) {
        return Ok(None);
    }

    let achievement_id = Uuid::new_v4().to_string();
    let achievement = repositories::achievements::get_or_create(
        &mut **tx,
        NewAchievement {
            id: &achievement_id,
            name: PROPHETIC_NAME,
            description: PROPHETIC_DESCRIPTION,
            category: AchievementCategory::Especialidad,
            points: 20,
            icon: "🔮",
        },
    )
    .await
    .context("Failed to load achievement")?;

    let award_id = Uuid::new_v4().to_string();
    let granted = repositories::achievements::award(
        &mut **tx,
        &award_id,
        student_id,
        &achievement.id,
        primitive_now_utc(),
    )
    .await
    .context("Failed to award achievement")?;

    if !granted {
        return Ok(None);
    }

    let draft = notifications::achievement_unlocked(PROPHETIC_NAME);
    notifications::send(&mut **tx, student_id, None, &draft).await?;
    tracing::info!(
        user_id = %student_id,
        achievement = PROPHETIC_NAME,
        action = "achievement_awarded",
        "Achievement awarded"
    );
    Ok(Some(PROPHETIC_NAME))
}
