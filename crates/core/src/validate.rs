//! Field validation helpers shared by submissions and registrations.

use crate::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

/// Longest address accepted (RFC 5321 path limit).
const MAX_EMAIL_LEN: usize = 254;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
    .expect("email pattern must compile")
});

/// Check that an email address is syntactically valid.
pub fn validate_email(field: &str, value: &str) -> Result<()> {
    if value.len() > MAX_EMAIL_LEN || !EMAIL_RE.is_match(value) {
        return Err(Error::Validation(format!(
            "{field} is not a valid email address"
        )));
    }
    Ok(())
}

/// Check that a field's length in characters lies within `min..=max`.
pub fn validate_length(field: &str, value: &str, min: usize, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len < min {
        return Err(Error::Validation(format!(
            "{field} must be at least {min} characters"
        )));
    }
    if len > max {
        return Err(Error::Validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}
