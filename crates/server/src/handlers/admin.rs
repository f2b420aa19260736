//! Administrator registration, login and profile handlers.

use crate::auth::CurrentAdmin;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use clientpulse_core::password::{hash_password, verify_password};
use clientpulse_core::{AdminCredentials, AdminRegistration};
use clientpulse_metadata::MetadataError;
use clientpulse_metadata::models::{AdminRow, NewAdmin};
use serde::Serialize;
use time::OffsetDateTime;

const USERNAME_TAKEN: &str = "Username already registered";
const EMAIL_TAKEN: &str = "Email already registered";
const BAD_CREDENTIALS: &str = "Incorrect username or password";

/// Public administrator profile. Never includes the password hash.
#[derive(Debug, Serialize)]
pub struct AdminProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<AdminRow> for AdminProfile {
    fn from(row: AdminRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            email: row.email,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

/// Login response.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

/// POST /api/admin/register - Create an administrator.
///
/// The registration gate is checked before the body is looked at: once an
/// administrator exists and registration is locked, every attempt is 403.
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<AdminRegistration>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AdminProfile>)> {
    let existing = state.metadata.count_admins().await?;
    if existing > 0 && !state.config.auth.allow_admin_registration {
        return Err(ApiError::Forbidden(
            "Admin registration is disabled".to_string(),
        ));
    }

    let Json(registration) = payload?;
    registration.validate()?;

    if state
        .metadata
        .get_admin_by_username(&registration.username)
        .await?
        .is_some()
    {
        return Err(ApiError::BadRequest(USERNAME_TAKEN.to_string()));
    }
    if state
        .metadata
        .get_admin_by_email(&registration.email)
        .await?
        .is_some()
    {
        return Err(ApiError::BadRequest(EMAIL_TAKEN.to_string()));
    }

    let password = registration.password;
    let hashed_password = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::Internal(format!("password hashing task failed: {e}")))??;

    let new_admin = NewAdmin {
        username: registration.username,
        email: registration.email,
        hashed_password,
        created_at: OffsetDateTime::now_utc(),
    };
    let admin = match state.metadata.create_admin(&new_admin).await {
        Ok(admin) => admin,
        // Lost a race with a concurrent registration.
        Err(MetadataError::AlreadyExists(column)) if column == "username" => {
            return Err(ApiError::BadRequest(USERNAME_TAKEN.to_string()));
        }
        Err(MetadataError::AlreadyExists(_)) => {
            return Err(ApiError::BadRequest(EMAIL_TAKEN.to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(
        admin_id = admin.id,
        username = %admin.username,
        bootstrap = existing == 0,
        "Administrator registered"
    );
    Ok((StatusCode::CREATED, Json(admin.into())))
}

/// POST /api/admin/login - Exchange credentials for an access token.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<AdminCredentials>, JsonRejection>,
) -> ApiResult<Json<TokenResponse>> {
    let Json(credentials) = payload?;

    let Some(admin) = state
        .metadata
        .get_admin_by_username(&credentials.username)
        .await?
    else {
        return Err(ApiError::Unauthorized(BAD_CREDENTIALS.to_string()));
    };

    let password = credentials.password;
    let hash = admin.hashed_password.clone();
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| ApiError::Internal(format!("password verification task failed: {e}")))?;
    if !verified {
        tracing::debug!(admin_id = admin.id, "Login rejected: wrong password");
        return Err(ApiError::Unauthorized(BAD_CREDENTIALS.to_string()));
    }
    if !admin.is_active {
        return Err(ApiError::Forbidden("Inactive user".to_string()));
    }

    let access_token = state.tokens.issue(admin.id)?;
    tracing::info!(admin_id = admin.id, "Administrator logged in");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
    }))
}

/// GET /api/admin/me - Profile of the authenticated administrator.
pub async fn me(CurrentAdmin(admin): CurrentAdmin) -> Json<AdminProfile> {
    Json(admin.into())
}
