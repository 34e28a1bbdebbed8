use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{AppError, AppResult};

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Normalizes the email and checks both credentials, returning the email to store.
pub(crate) fn validate_credentials(email: &str, password: &str) -> AppResult<String> {
    let email = normalize_email(email);
    if !is_valid_email(&email) {
        return Err(AppError::Validation(format!("{email:?} is not a valid email")));
    }
    if password.is_empty() {
        return Err(AppError::Validation("password must not be empty".into()));
    }
    Ok(email)
}
