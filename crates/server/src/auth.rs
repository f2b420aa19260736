//! Bearer authentication for administrator endpoints.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use clientpulse_core::TokenService;
use clientpulse_metadata::models::AdminRow;
use clientpulse_metadata::{MetadataError, MetadataStore};

/// Why a request could not be tied to an active administrator.
#[derive(Debug, thiserror::Error)]
pub enum AuthFailure {
    #[error("Not authenticated")]
    MissingToken,

    /// Bad signature, expired, or a subject that is not an id.
    #[error("Could not validate credentials")]
    InvalidToken,

    #[error("Could not validate credentials")]
    UnknownAdmin,

    #[error("Inactive user")]
    Inactive,

    #[error(transparent)]
    Store(#[from] MetadataError),
}

impl From<AuthFailure> for ApiError {
    fn from(failure: AuthFailure) -> Self {
        match failure {
            AuthFailure::MissingToken | AuthFailure::InvalidToken | AuthFailure::UnknownAdmin => {
                ApiError::Unauthorized(failure.to_string())
            }
            AuthFailure::Inactive => ApiError::Forbidden(failure.to_string()),
            AuthFailure::Store(e) => ApiError::Metadata(e),
        }
    }
}

/// Extract bearer token from Authorization header.
/// Per RFC 6750, the "Bearer" scheme is case-insensitive.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            if v.len() >= 7 && v[..7].eq_ignore_ascii_case("bearer ") {
                Some(v[7..].trim())
            } else {
                None
            }
        })
        .filter(|token| !token.is_empty())
}

/// Resolve a bearer token to an active administrator.
pub async fn resolve_admin(
    tokens: &TokenService,
    metadata: &dyn MetadataStore,
    bearer: Option<&str>,
) -> Result<AdminRow, AuthFailure> {
    let token = bearer.ok_or(AuthFailure::MissingToken)?;
    let claims = tokens.verify(token).map_err(|_| AuthFailure::InvalidToken)?;
    let admin_id = claims.admin_id().ok_or(AuthFailure::InvalidToken)?;

    let admin = metadata
        .get_admin(admin_id)
        .await?
        .ok_or(AuthFailure::UnknownAdmin)?;
    if !admin.is_active {
        tracing::debug!(admin_id, "Rejected token for inactive administrator");
        return Err(AuthFailure::Inactive);
    }
    Ok(admin)
}

/// The authenticated administrator of the current request.
#[derive(Clone, Debug)]
pub struct CurrentAdmin(pub AdminRow);

impl FromRequestParts<AppState> for CurrentAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let bearer = extract_bearer_token(&parts.headers);
        let admin = resolve_admin(&state.tokens, state.metadata.as_ref(), bearer).await?;
        Ok(Self(admin))
    }
}
