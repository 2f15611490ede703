pub(crate) mod achievements;
pub(crate) mod availability;
pub(crate) mod booking_date;
pub(crate) mod external_api;
pub(crate) mod notifications;
pub(crate) mod rank;
pub(crate) mod session_guard;
pub(crate) mod tutor_stats;
