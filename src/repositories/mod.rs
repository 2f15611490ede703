pub(crate) mod achievements;
pub(crate) mod auth_sessions;
pub(crate) mod availability;
pub(crate) mod catalog;
pub(crate) mod groups;
pub(crate) mod health;
pub(crate) mod messages;
pub(crate) mod notifications;
pub(crate) mod resources;
pub(crate) mod tutoring_sessions;
pub(crate) mod tutors;
pub(crate) mod users;
