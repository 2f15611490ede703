use serde::Serialize;

use crate::schemas::user::UserResponse;

/// Returned by login and registration. The same token is also set as the
/// session cookie.
#[derive(Debug, Serialize)]
pub(crate) struct SessionResponse {
    pub(crate) access_token: String,
    pub(crate) token_type: String,
    pub(crate) user: UserResponse,
}

#[derive(Debug, Serialize)]
pub(crate) struct LogoutResponse {
    pub(crate) detail: &'static str,
}
