pub(crate) mod admin;
pub(crate) mod auth;
pub(crate) mod availability;
pub(crate) mod chat;
pub(crate) mod dashboard;
pub(crate) mod errors;
pub(crate) mod guards;
pub(crate) mod handlers;
pub(crate) mod notifications;
pub(crate) mod pagination;
pub(crate) mod proxy;
pub(crate) mod resources;
pub(crate) mod rest;
pub(crate) mod router;
pub(crate) mod session_layer;
pub(crate) mod sessions;
pub(crate) mod tutors;
pub(crate) mod validation;
