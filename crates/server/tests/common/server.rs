//! Server test utilities.

use clientpulse_core::config::AppConfig;
use clientpulse_metadata::{MetadataStore, SqliteStore};
use clientpulse_server::{AppState, create_router};
use clientpulse_storage::{ObjectStore, ScreenshotStore};
use std::sync::Arc;
use tempfile::TempDir;

/// Public URL base used for screenshot stores in tests.
#[allow(dead_code)]
pub const TEST_URL_BASE: &str = "http://objects.test/screens";

/// A test server wrapper with all dependencies.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    sqlite: Arc<SqliteStore>,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    /// Create a new test server with a temporary database and no screenshot storage.
    pub async fn new() -> Self {
        Self::build(|_| {}, ScreenshotStore::disabled()).await
    }

    /// Create a test server with custom config modifications.
    pub async fn with_config<F>(modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        Self::build(modifier, ScreenshotStore::disabled()).await
    }

    /// Create a test server whose screenshots go to `store`.
    pub async fn with_screenshots(store: Arc<dyn ObjectStore>) -> Self {
        Self::build(|_| {}, ScreenshotStore::new(store, TEST_URL_BASE)).await
    }

    async fn build<F>(modifier: F, screenshots: ScreenshotStore) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");

        let db_path = temp_dir.path().join("clientpulse.db");
        let sqlite = Arc::new(
            SqliteStore::new(&db_path)
                .await
                .expect("Failed to create metadata store"),
        );
        let metadata: Arc<dyn MetadataStore> = sqlite.clone();

        let mut config = AppConfig::for_testing();
        config.database.url = format!("sqlite://{}", db_path.display());
        modifier(&mut config);

        let state =
            AppState::new(config, metadata, screenshots).expect("Failed to create app state");
        let router = create_router(state.clone());

        Self {
            router,
            state,
            sqlite,
            _temp_dir: temp_dir,
        }
    }

    /// Get access to the underlying metadata.
    pub fn metadata(&self) -> Arc<dyn MetadataStore> {
        self.state.metadata.clone()
    }

    /// Direct pool access for state the API cannot produce.
    pub fn pool(&self) -> &sqlx::SqlitePool {
        self.sqlite.pool()
    }
}
