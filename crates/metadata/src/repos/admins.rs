//! Administrator repository.

use crate::error::MetadataResult;
use crate::models::{AdminRow, NewAdmin};
use async_trait::async_trait;

/// Repository for administrator accounts.
#[async_trait]
pub trait AdminRepo: Send + Sync {
    /// Insert an administrator.
    ///
    /// Returns `AlreadyExists("username")` or `AlreadyExists("email")` when a
    /// unique constraint rejects the row.
    async fn create_admin(&self, admin: &NewAdmin) -> MetadataResult<AdminRow>;

    /// Get an administrator by ID.
    async fn get_admin(&self, id: i64) -> MetadataResult<Option<AdminRow>>;

    /// Get an administrator by username.
    async fn get_admin_by_username(&self, username: &str) -> MetadataResult<Option<AdminRow>>;

    /// Get an administrator by email.
    async fn get_admin_by_email(&self, email: &str) -> MetadataResult<Option<AdminRow>>;

    /// Count administrators, active or not.
    async fn count_admins(&self) -> MetadataResult<i64>;
}
