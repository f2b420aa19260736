//! Best-effort screenshot uploads.
//!
//! The adapter is either enabled (a reachable backend plus the public URL
//! base for its bucket) or disabled. Failures are logged and reported as
//! `None`/`false`; they never reach the caller as errors.

use crate::backends::s3::{S3Backend, normalize_endpoint};
use crate::error::StorageError;
use crate::traits::ObjectStore;
use bytes::Bytes;
use clientpulse_core::config::S3Config;
use std::sync::Arc;
use uuid::Uuid;

/// Folder holding every screenshot key.
pub const SCREENSHOT_PREFIX: &str = "screenshots";

/// Public URL base for objects in `bucket`.
///
/// Virtual-hosted AWS style unless a custom endpoint is configured, in which
/// case objects are addressed as `{endpoint}/{bucket}/{key}`.
pub fn public_url_base(bucket: &str, region: &str, endpoint: Option<&str>) -> String {
    match endpoint.filter(|e| !e.trim().is_empty()) {
        Some(endpoint) => format!("{}/{bucket}", normalize_endpoint(endpoint)),
        None => format!("https://{bucket}.s3.{region}.amazonaws.com"),
    }
}

struct Enabled {
    store: Arc<dyn ObjectStore>,
    url_base: String,
}

/// Screenshot storage adapter shared by request handlers.
#[derive(Clone, Default)]
pub struct ScreenshotStore {
    inner: Option<Arc<Enabled>>,
}

impl std::fmt::Debug for ScreenshotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenshotStore")
            .field("enabled", &self.is_enabled())
            .field("url_base", &self.inner.as_ref().map(|i| i.url_base.as_str()))
            .finish()
    }
}

impl ScreenshotStore {
    /// An adapter that stores nothing.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Wrap a backend without probing it.
    pub fn new(store: Arc<dyn ObjectStore>, url_base: impl Into<String>) -> Self {
        let url_base = url_base.into().trim_end_matches('/').to_string();
        Self {
            inner: Some(Arc::new(Enabled { store, url_base })),
        }
    }

    /// Probe the backend and enable the adapter only if it is reachable.
    pub async fn connect(store: Arc<dyn ObjectStore>, url_base: impl Into<String>) -> Self {
        match store.health_check().await {
            Ok(()) => {
                let adapter = Self::new(store, url_base);
                tracing::info!(
                    url_base = adapter.inner.as_ref().map(|i| i.url_base.as_str()),
                    "Screenshot uploads enabled"
                );
                adapter
            }
            Err(StorageError::BucketNotFound(bucket)) => {
                tracing::error!(bucket = %bucket, "S3 bucket does not exist; screenshot uploads disabled");
                Self::disabled()
            }
            Err(StorageError::AccessDenied(bucket)) => {
                tracing::error!(bucket = %bucket, "Access to S3 bucket denied; screenshot uploads disabled");
                Self::disabled()
            }
            Err(e) => {
                tracing::error!(error = %e, "S3 reachability check failed; screenshot uploads disabled");
                Self::disabled()
            }
        }
    }

    /// Build the adapter from configuration.
    ///
    /// Disabled unless access key, secret key and bucket are all set and the
    /// bucket answers a HeadBucket probe.
    pub async fn from_config(config: &S3Config) -> Self {
        let Some((access_key_id, secret_access_key, bucket)) = config.credentials() else {
            tracing::info!("S3 not configured; screenshot uploads disabled");
            return Self::disabled();
        };

        let backend = match S3Backend::new(
            bucket,
            config.endpoint.as_deref(),
            &config.region,
            access_key_id,
            secret_access_key,
            config.force_path_style,
        ) {
            Ok(backend) => backend,
            Err(e) => {
                tracing::error!(error = %e, "Failed to build S3 client; screenshot uploads disabled");
                return Self::disabled();
            }
        };

        let url_base = public_url_base(bucket, &config.region, config.endpoint.as_deref());
        Self::connect(Arc::new(backend), url_base).await
    }

    /// Whether uploads are attempted at all.
    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Store a screenshot and return its public URL.
    ///
    /// `extension` must already be sanitized. Returns `None` when disabled or
    /// when the upload fails.
    pub async fn upload(&self, data: Bytes, extension: &str) -> Option<String> {
        let inner = self.inner.as_ref()?;
        let key = format!("{SCREENSHOT_PREFIX}/{}.{extension}", Uuid::new_v4());
        let content_type = format!("image/{extension}");

        match inner.store.put(&key, data, &content_type).await {
            Ok(()) => {
                tracing::debug!(key = %key, "Uploaded screenshot");
                Some(format!("{}/{key}", inner.url_base))
            }
            Err(e) => {
                tracing::error!(key = %key, error = %e, "Screenshot upload failed");
                None
            }
        }
    }

    /// Delete a screenshot previously returned by [`upload`](Self::upload).
    ///
    /// Returns false when disabled, when the URL does not belong to this
    /// bucket, or when the backend reports an error.
    pub async fn delete(&self, url: &str) -> bool {
        let Some(inner) = self.inner.as_ref() else {
            return false;
        };
        let Some(key) = url
            .strip_prefix(inner.url_base.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|key| !key.is_empty())
        else {
            tracing::warn!(url = %url, "Screenshot URL does not match the configured bucket");
            return false;
        };

        match inner.store.delete(key).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(key = %key, error = %e, "Screenshot delete failed");
                false
            }
        }
    }
}
