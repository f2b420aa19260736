//! Signed access tokens.
//!
//! Tokens are stateless JWTs carrying the administrator id as `sub` and an
//! absolute `exp`. There is no revocation list: rotating the signing secret
//! invalidates every outstanding token.

use crate::config::{AuthConfig, SUPPORTED_TOKEN_ALGORITHMS};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use time::{Duration, OffsetDateTime};

/// Token service errors.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("unsupported token algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("token signing secret must not be empty")]
    EmptySecret,

    #[error("failed to sign token: {0}")]
    Signing(String),

    /// Bad signature, malformed token, wrong algorithm or expired.
    #[error("invalid token")]
    Invalid,
}

/// Claims embedded in every access token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Administrator id, in string form.
    pub sub: String,
    /// Expiration (unix seconds).
    pub exp: i64,
    /// Issued-at (unix seconds).
    pub iat: i64,
}

impl TokenClaims {
    /// Parse the subject back into an administrator id.
    pub fn admin_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

/// Issues and verifies access tokens with a server-held HMAC secret.
#[derive(Clone)]
pub struct TokenService {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &self.algorithm)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Create a token service.
    ///
    /// Only HMAC algorithms are accepted since the key is a shared secret.
    pub fn new(secret: &str, algorithm: &str, ttl: Duration) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }
        if !SUPPORTED_TOKEN_ALGORITHMS.contains(&algorithm) {
            return Err(TokenError::UnsupportedAlgorithm(algorithm.to_string()));
        }
        let algorithm = Algorithm::from_str(algorithm)
            .map_err(|_| TokenError::UnsupportedAlgorithm(algorithm.to_string()))?;

        let mut validation = Validation::new(algorithm);
        validation.leeway = 0;

        Ok(Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        })
    }

    /// Create a token service from the authentication configuration.
    pub fn from_config(config: &AuthConfig) -> Result<Self, TokenError> {
        Self::new(
            &config.secret_key,
            &config.algorithm,
            config.access_token_ttl(),
        )
    }

    /// Configured token lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for an administrator with the configured lifetime.
    pub fn issue(&self, admin_id: i64) -> Result<String, TokenError> {
        self.issue_with_ttl(admin_id, self.ttl)
    }

    /// Issue a token with an explicit lifetime.
    pub fn issue_with_ttl(&self, admin_id: i64, ttl: Duration) -> Result<String, TokenError> {
        let now = OffsetDateTime::now_utc();
        let expires = now
            .checked_add(ttl)
            .ok_or_else(|| TokenError::Signing(format!("token lifetime {ttl} is out of range")))?;
        let claims = TokenClaims {
            sub: admin_id.to_string(),
            exp: expires.unix_timestamp(),
            iat: now.unix_timestamp(),
        };
        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify signature and expiry, returning the claims only if both pass.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::Invalid)
    }
}
