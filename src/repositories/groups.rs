use sqlx::PgPool;

use crate::db::models::GroupSummary;

pub(crate) const TUTORS_GROUP: &str = "Tutores";
pub(crate) const STUDENTS_GROUP: &str = "Estudiantes";

pub(crate) async fn list_summaries(pool: &PgPool) -> Result<Vec<GroupSummary>, sqlx::Error> {
    sqlx::query_as::<_, GroupSummary>(
        "SELECT g.id, g.name,
            COALESCE(
                (SELECT ARRAY_AGG(gp.codename::TEXT ORDER BY gp.codename)
                 FROM group_permissions gp WHERE gp.group_id = g.id),
                ARRAY[]::TEXT[]
            ) AS permissions,
            (SELECT COUNT(*) FROM user_groups ug WHERE ug.group_id = g.id) AS member_count
         FROM groups g
         ORDER BY g.name",
    )
    .fetch_all(pool)
    .await
}

/// Adds the user to the group called `group_name`; unknown groups are ignored.
pub(crate) async fn add_member_by_name(
    executor: impl sqlx::PgExecutor<'_>,
    user_id: &str,
    group_name: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO user_groups (user_id, group_id)
         SELECT $1, id FROM groups WHERE name = $2
         ON CONFLICT DO NOTHING",
    )
    .bind(user_id)
    .bind(group_name)
    .execute(executor)
    .await?;
    Ok(())
}
