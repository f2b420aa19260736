//! Application state shared across handlers.

use clientpulse_core::config::AppConfig;
use clientpulse_core::{TokenError, TokenService};
use clientpulse_metadata::MetadataStore;
use clientpulse_storage::ScreenshotStore;
use std::sync::Arc;

/// Shared application state. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Metadata store.
    pub metadata: Arc<dyn MetadataStore>,
    /// Access token issuer and verifier.
    pub tokens: Arc<TokenService>,
    /// Screenshot storage adapter (possibly disabled).
    pub screenshots: ScreenshotStore,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Fails when the token configuration is unusable.
    pub fn new(
        config: AppConfig,
        metadata: Arc<dyn MetadataStore>,
        screenshots: ScreenshotStore,
    ) -> Result<Self, TokenError> {
        let tokens = TokenService::from_config(&config.auth)?;
        if config.auth.allow_admin_registration {
            tracing::warn!(
                "auth.allow_admin_registration is enabled; anyone can register an administrator"
            );
        }

        Ok(Self {
            config: Arc::new(config),
            metadata,
            tokens: Arc::new(tokens),
            screenshots,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clientpulse_metadata::SqliteStore;

    #[tokio::test]
    async fn new_rejects_unsupported_algorithm() {
        let metadata: Arc<dyn MetadataStore> =
            Arc::new(SqliteStore::from_url("sqlite::memory:").await.unwrap());
        let mut config = AppConfig::for_testing();
        config.auth.algorithm = "RS256".to_string();

        let result = AppState::new(config, metadata, ScreenshotStore::disabled());
        assert!(matches!(result, Err(TokenError::UnsupportedAlgorithm(_))));
    }

    #[tokio::test]
    async fn new_builds_token_service_from_config() {
        let metadata: Arc<dyn MetadataStore> =
            Arc::new(SqliteStore::from_url("sqlite::memory:").await.unwrap());
        let mut config = AppConfig::for_testing();
        config.auth.access_token_expire_minutes = 5;

        let state = AppState::new(config, metadata, ScreenshotStore::disabled()).unwrap();
        assert_eq!(state.tokens.ttl(), time::Duration::minutes(5));
        assert!(!state.screenshots.is_enabled());
    }
}
