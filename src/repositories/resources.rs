use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::EducationalResource;
use crate::db::types::ResourceKind;

const COLUMNS: &str = "\
    id, tutor_id, subject_id, title, description, kind, file_url, content, downloads, \
    active, created_at";

pub(crate) struct CreateResource<'a> {
    pub(crate) id: &'a str,
    pub(crate) tutor_id: &'a str,
    pub(crate) subject_id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) description: &'a str,
    pub(crate) kind: ResourceKind,
    pub(crate) file_url: Option<&'a str>,
    pub(crate) content: &'a str,
    pub(crate) created_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateResource<'_>,
) -> Result<EducationalResource, sqlx::Error> {
    sqlx::query_as::<_, EducationalResource>(&format!(
        "INSERT INTO educational_resources (
            id, tutor_id, subject_id, title, description, kind, file_url, content, created_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)
        RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.tutor_id)
    .bind(params.subject_id)
    .bind(params.title)
    .bind(params.description)
    .bind(params.kind)
    .bind(params.file_url)
    .bind(params.content)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    id: &str,
) -> Result<Option<EducationalResource>, sqlx::Error> {
    sqlx::query_as::<_, EducationalResource>(&format!(
        "SELECT {COLUMNS} FROM educational_resources WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Active resources, newest first.
pub(crate) async fn list_active(
    pool: &PgPool,
    offset: i64,
    limit: i64,
) -> Result<Vec<EducationalResource>, sqlx::Error> {
    sqlx::query_as::<_, EducationalResource>(&format!(
        "SELECT {COLUMNS} FROM educational_resources WHERE active = TRUE
         ORDER BY created_at DESC, id OFFSET $1 LIMIT $2"
    ))
    .bind(offset)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub(crate) async fn count_active(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM educational_resources WHERE active = TRUE")
        .fetch_one(pool)
        .await
}

#[derive(Debug, Default)]
pub(crate) struct UpdateResource {
    pub(crate) subject_id: Option<String>,
    pub(crate) title: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) kind: Option<ResourceKind>,
    pub(crate) file_url: Option<String>,
    pub(crate) content: Option<String>,
    pub(crate) active: Option<bool>,
}

pub(crate) async fn update(
    pool: &PgPool,
    id: &str,
    params: UpdateResource,
) -> Result<Option<EducationalResource>, sqlx::Error> {
    sqlx::query_as::<_, EducationalResource>(&format!(
        "UPDATE educational_resources SET
            subject_id = COALESCE($1, subject_id),
            title = COALESCE($2, title),
            description = COALESCE($3, description),
            kind = COALESCE($4, kind),
            file_url = COALESCE($5, file_url),
            content = COALESCE($6, content),
            active = COALESCE($7, active)
         WHERE id = $8
         RETURNING {COLUMNS}"
    ))
    .bind(params.subject_id)
    .bind(params.title)
    .bind(params.description)
    .bind(params.kind)
    .bind(params.file_url)
    .bind(params.content)
    .bind(params.active)
    .bind(id)
    .fetch_optional(pool)
    .await
}
