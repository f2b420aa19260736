//! Relational store for ClientPulse.
//!
//! This crate owns the persisted data model:
//! - Administrator accounts
//! - Feedback submissions and their aggregates
//!
//! Both SQLite and PostgreSQL are supported behind the [`MetadataStore`] trait.

pub mod error;
pub mod models;
pub mod postgres;
pub mod repos;
pub mod store;

pub use error::{MetadataError, MetadataResult};
pub use postgres::PostgresStore;
pub use store::{MetadataStore, SqliteStore};

use clientpulse_core::config::{DatabaseConfig, DatabaseKind, redact_url};
use std::sync::Arc;

/// Create a metadata store from configuration. The URL scheme picks the backend.
pub async fn from_config(config: &DatabaseConfig) -> MetadataResult<Arc<dyn MetadataStore>> {
    let kind = config.kind().map_err(MetadataError::Config)?;
    tracing::info!(url = %redact_url(&config.url), ?kind, "Connecting to database");
    match kind {
        DatabaseKind::Sqlite => {
            let store = SqliteStore::from_url(config.url.trim()).await?;
            Ok(Arc::new(store) as Arc<dyn MetadataStore>)
        }
        DatabaseKind::Postgres => {
            let store = PostgresStore::from_url(config.url.trim(), config.max_connections).await?;
            Ok(Arc::new(store) as Arc<dyn MetadataStore>)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::AdminRepo;

    #[tokio::test]
    async fn test_from_config_sqlite() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("data").join("clientpulse.db");
        let config = DatabaseConfig {
            url: format!("sqlite://{}", db_path.display()),
            max_connections: 10,
        };

        let store = from_config(&config).await.unwrap();
        store.health_check().await.unwrap();
        assert_eq!(store.count_admins().await.unwrap(), 0);
        assert!(db_path.exists());
    }

    #[tokio::test]
    async fn test_from_config_rejects_unknown_scheme() {
        let config = DatabaseConfig {
            url: "mysql://localhost/clientpulse".to_string(),
            max_connections: 10,
        };
        assert!(matches!(
            from_config(&config).await,
            Err(MetadataError::Config(_))
        ));
    }
}
