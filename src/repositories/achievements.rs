use time::PrimitiveDateTime;

use crate::db::models::Achievement;
use crate::db::types::AchievementCategory;

const COLUMNS: &str = "id, name, description, category, points, icon, active";

pub(crate) struct NewAchievement<'a> {
    pub(crate) id: &'a str,
    pub(crate) name: &'a str,
    pub(crate) description: &'a str,
    pub(crate) category: AchievementCategory,
    pub(crate) points: i32,
    pub(crate) icon: &'a str,
}

/// Returns the achievement named `params.name`, creating it on first use.
pub(crate) async fn get_or_create(
    executor: impl sqlx::PgExecutor<'_>,
    params: NewAchievement<'_>,
) -> Result<Achievement, sqlx::Error> {
    // The no-op update makes RETURNING yield the existing row on conflict.
    sqlx::query_as::<_, Achievement>(&format!(
        "INSERT INTO achievements (id, name, description, category, points, icon, active)
         VALUES ($1, $2, $3, $4, $5, $6, TRUE)
         ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
         RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.name)
    .bind(params.description)
    .bind(params.category)
    .bind(params.points)
    .bind(params.icon)
    .fetch_one(executor)
    .await
}

/// Returns true only when the award row was newly inserted.
pub(crate) async fn award(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    user_id: &str,
    achievement_id: &str,
    awarded_at: PrimitiveDateTime,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO user_achievements (id, user_id, achievement_id, awarded_at)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (user_id, achievement_id) DO NOTHING",
    )
    .bind(id)
    .bind(user_id)
    .bind(achievement_id)
    .bind(awarded_at)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn list_for_user(
    executor: impl sqlx::PgExecutor<'_>,
    user_id: &str,
) -> Result<Vec<Achievement>, sqlx::Error> {
    sqlx::query_as::<_, Achievement>(
        "SELECT a.id, a.name, a.description, a.category, a.points, a.icon, a.active
         FROM achievements a JOIN user_achievements ua ON ua.achievement_id = a.id
         WHERE ua.user_id = $1
         ORDER BY ua.awarded_at DESC",
    )
    .bind(user_id)
    .fetch_all(executor)
    .await
}
