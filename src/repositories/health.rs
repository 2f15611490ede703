use sqlx::PgPool;

/// Round-trips the pool and reports whether the seeded catalog is present.
pub(crate) async fn catalog_seeded(pool: &PgPool) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM groups) AND EXISTS (SELECT 1 FROM subjects WHERE active)",
    )
    .fetch_one(pool)
    .await
}
