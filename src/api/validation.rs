use std::collections::BTreeMap;

use serde::Serialize;
use validator::Validate;

use crate::api::errors::ApiError;

pub(crate) const MIN_PASSWORD_LEN: usize = 8;
pub(crate) const MAX_RUT_LEN: usize = 12;

/// Field name to messages, rendered as the `errors` object of a 400 response.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub(crate) struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub(crate) fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn into_result(self) -> Result<(), ApiError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self))
        }
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = Self::new();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                fields.add(field.as_ref(), message);
            }
        }
        fields
    }
}

/// Runs the derive-based checks of `payload` and merges in `extra` errors.
pub(crate) fn validate_with<T: Validate>(
    payload: &T,
    extra: impl FnOnce(&mut FieldErrors),
) -> Result<(), ApiError> {
    let mut errors = match payload.validate() {
        Ok(()) => FieldErrors::new(),
        Err(errors) => FieldErrors::from(errors),
    };
    extra(&mut errors);
    errors.into_result()
}

pub(crate) fn validate_payload<T: Validate>(payload: &T) -> Result<(), ApiError> {
    validate_with(payload, |_| {})
}

/// RUT as typed by the user: digits, optional dots, a dash and a check digit.
pub(crate) fn is_valid_rut(rut: &str) -> bool {
    let rut = rut.trim();
    if rut.is_empty() || rut.len() > MAX_RUT_LEN {
        return false;
    }
    let Some((body, check)) = rut.rsplit_once('-') else {
        return false;
    };
    let body_ok = !body.is_empty()
        && body.chars().all(|c| c.is_ascii_digit() || c == '.')
        && body.chars().any(|c| c.is_ascii_digit());
    let check_ok =
        check.len() == 1 && check.chars().all(|c| c.is_ascii_digit() || c == 'k' || c == 'K');
    body_ok && check_ok
}

pub(crate) fn check_password(errors: &mut FieldErrors, field: &str, password: &str) {
    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.add(
            field,
            format!("Password must be at least {MIN_PASSWORD_LEN} characters long"),
        );
    }
    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        errors.add(field, "Password can't be entirely numeric");
    }
}
