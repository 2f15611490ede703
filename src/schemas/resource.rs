use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::EducationalResource;
use crate::db::types::ResourceKind;

#[derive(Debug, Serialize)]
pub(crate) struct ResourceResponse {
    pub(crate) id: String,
    pub(crate) tutor_id: String,
    pub(crate) subject_id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) kind: ResourceKind,
    pub(crate) file_url: Option<String>,
    pub(crate) content: String,
    pub(crate) downloads: i32,
    pub(crate) active: bool,
    pub(crate) created_at: String,
}

impl ResourceResponse {
    pub(crate) fn from_db(resource: EducationalResource) -> Self {
        Self {
            id: resource.id,
            tutor_id: resource.tutor_id,
            subject_id: resource.subject_id,
            title: resource.title,
            description: resource.description,
            kind: resource.kind,
            file_url: resource.file_url,
            content: resource.content,
            downloads: resource.downloads,
            active: resource.active,
            created_at: format_primitive(resource.created_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ResourceCreate {
    #[serde(alias = "asignatura")]
    pub(crate) subject_id: String,
    #[serde(alias = "titulo")]
    #[validate(length(min = 1, max = 200, message = "title must be 1 to 200 characters"))]
    pub(crate) title: String,
    #[serde(default)]
    #[serde(alias = "descripcion")]
    pub(crate) description: String,
    #[serde(alias = "tipo")]
    pub(crate) kind: ResourceKind,
    #[serde(default)]
    #[serde(alias = "archivo")]
    pub(crate) file_url: Option<String>,
    #[serde(default)]
    #[serde(alias = "contenido")]
    pub(crate) content: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub(crate) struct ResourceUpdate {
    #[serde(default)]
    pub(crate) subject_id: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "title must be 1 to 200 characters"))]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    pub(crate) kind: Option<ResourceKind>,
    #[serde(default)]
    pub(crate) file_url: Option<String>,
    #[serde(default)]
    pub(crate) content: Option<String>,
    #[serde(default)]
    pub(crate) active: Option<bool>,
}

/// Resources keep a link instead of an uploaded file.
pub(crate) fn is_valid_file_url(value: &str) -> bool {
    let value = value.trim();
    (value.starts_with("http://") || value.starts_with("https://"))
        && !value.contains(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_urls_must_be_http() {
        assert!(is_valid_file_url("https://cdn.inacap.cl/guia.pdf"));
        assert!(!is_valid_file_url("ftp://cdn.inacap.cl/guia.pdf"));
        assert!(!is_valid_file_url("https://cdn.inacap.cl/mi guia.pdf"));
    }
}
