//! Administrator registration and login payloads.

use crate::Result;
use crate::validate::{validate_email, validate_length};
use serde::Deserialize;

pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_USERNAME_LEN: usize = 100;
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 100;

/// Body of `POST /api/admin/register`.
#[derive(Clone, Deserialize)]
pub struct AdminRegistration {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl AdminRegistration {
    pub fn validate(&self) -> Result<()> {
        validate_length("username", &self.username, MIN_USERNAME_LEN, MAX_USERNAME_LEN)?;
        validate_email("email", &self.email)?;
        validate_length("password", &self.password, MIN_PASSWORD_LEN, MAX_PASSWORD_LEN)?;
        Ok(())
    }
}

impl std::fmt::Debug for AdminRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminRegistration")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Body of `POST /api/admin/login`.
#[derive(Clone, Deserialize)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}
