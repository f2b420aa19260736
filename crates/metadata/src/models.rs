//! Database models mapping to the metadata schema.

use sqlx::FromRow;
use time::OffsetDateTime;

// =============================================================================
// Administrators
// =============================================================================

/// Administrator record.
#[derive(Debug, Clone, FromRow)]
pub struct AdminRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string, never the plaintext.
    pub hashed_password: String,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
}

/// Values for a new administrator; the id is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub username: String,
    pub email: String,
    pub hashed_password: String,
    pub created_at: OffsetDateTime,
}

// =============================================================================
// Feedback
// =============================================================================

/// Feedback record. Immutable once stored.
#[derive(Debug, Clone, FromRow)]
pub struct FeedbackRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub rating: i32,
    pub description: Option<String>,
    pub screenshot_url: Option<String>,
    pub client_ip: Option<String>,
    pub created_at: OffsetDateTime,
}

/// Values for a new feedback row; the id is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewFeedback {
    pub name: String,
    pub email: String,
    pub rating: i32,
    pub description: Option<String>,
    pub screenshot_url: Option<String>,
    pub client_ip: Option<String>,
    pub created_at: OffsetDateTime,
}
