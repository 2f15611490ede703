use std::collections::HashMap;

use serde::Serialize;

pub(crate) mod admin;
pub(crate) mod auth;
pub(crate) mod availability;
pub(crate) mod home;
pub(crate) mod message;
pub(crate) mod notification;
pub(crate) mod resource;
pub(crate) mod session;
pub(crate) mod tutor;
pub(crate) mod user;

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    pub(crate) service: String,
    pub(crate) status: String,
    pub(crate) components: HashMap<String, String>,
}
