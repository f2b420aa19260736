//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use time::Duration;

/// Longest accepted access token lifetime (ten years), in minutes.
pub const MAX_ACCESS_TOKEN_EXPIRE_MINUTES: u64 = 10 * 365 * 24 * 60;

/// HMAC algorithms accepted for access token signing.
pub const SUPPORTED_TOKEN_ALGORITHMS: &[&str] = &["HS256", "HS384", "HS512"];

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Application name reported in logs.
    #[serde(default = "default_app_name")]
    pub app_name: String,
    /// Deployment environment label ("development", "production", ...).
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Verbose logging when no RUST_LOG filter is set.
    #[serde(default = "default_debug")]
    pub debug: bool,
    /// Origins allowed for cross-origin requests.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
    /// Maximum accepted request body size for feedback submissions, in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_bind() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_app_name() -> String {
    "ClientPulse".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_debug() -> bool {
    true
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:8000".to_string(),
    ]
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            app_name: default_app_name(),
            environment: default_environment(),
            debug: default_debug(),
            cors_origins: default_cors_origins(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// Relational store configuration.
///
/// The URL scheme selects the backend: `sqlite:` for SQLite,
/// `postgres://` or `postgresql://` for PostgreSQL.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL (required).
    pub url: String,
    /// Maximum connections in the pool (PostgreSQL only).
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

/// Database backend selected by the connection URL.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DatabaseKind {
    Sqlite,
    Postgres,
}

impl DatabaseConfig {
    /// Determine which backend the URL points at.
    pub fn kind(&self) -> Result<DatabaseKind, String> {
        let url = self.url.trim();
        if url.starts_with("sqlite:") {
            Ok(DatabaseKind::Sqlite)
        } else if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(DatabaseKind::Postgres)
        } else if url.is_empty() {
            Err("database.url is required".to_string())
        } else {
            Err(format!(
                "database.url has an unsupported scheme (expected sqlite: or postgres://): {}",
                redact_url(url)
            ))
        }
    }
}

/// Strip credentials from a connection URL before logging it.
pub fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}

/// Authentication configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret used to sign access tokens (required).
    pub secret_key: String,
    /// Signing algorithm (HS256, HS384 or HS512).
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    /// Access token lifetime in minutes.
    #[serde(default = "default_access_token_expire_minutes")]
    pub access_token_expire_minutes: u64,
    /// Allow registering administrators after the first one exists.
    /// Set to false once the initial administrator has been created.
    #[serde(default = "default_allow_admin_registration")]
    pub allow_admin_registration: bool,
}

fn default_algorithm() -> String {
    "HS256".to_string()
}

fn default_access_token_expire_minutes() -> u64 {
    1440 // 24 hours
}

fn default_allow_admin_registration() -> bool {
    true
}

impl AuthConfig {
    /// Access token lifetime as a Duration.
    pub fn access_token_ttl(&self) -> Duration {
        let minutes = i64::try_from(self.access_token_expire_minutes).unwrap_or(i64::MAX / 60);
        Duration::minutes(minutes)
    }
}

/// S3 screenshot storage configuration.
///
/// Uploads stay disabled unless access key, secret key and bucket are all set.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct S3Config {
    /// AWS access key ID.
    #[serde(default)]
    pub access_key_id: Option<String>,
    /// AWS secret access key.
    /// WARNING: Prefer CLIENTPULSE_S3__SECRET_ACCESS_KEY over storing it in a config file.
    #[serde(default)]
    pub secret_access_key: Option<String>,
    /// Bucket receiving screenshots.
    #[serde(default)]
    pub bucket_name: Option<String>,
    /// AWS region.
    #[serde(default = "default_region")]
    pub region: String,
    /// Optional endpoint URL for S3-compatible services (MinIO, etc.).
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Use path-style addressing (`endpoint/bucket/key`).
    #[serde(default)]
    pub force_path_style: bool,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            access_key_id: None,
            secret_access_key: None,
            bucket_name: None,
            region: default_region(),
            endpoint: None,
            force_path_style: false,
        }
    }
}

impl S3Config {
    /// Credentials and bucket, if all three are configured and non-empty.
    pub fn credentials(&self) -> Option<(&str, &str, &str)> {
        fn non_empty(value: &Option<String>) -> Option<&str> {
            value.as_deref().filter(|s| !s.trim().is_empty())
        }
        Some((
            non_empty(&self.access_key_id)?,
            non_empty(&self.secret_access_key)?,
            non_empty(&self.bucket_name)?,
        ))
    }
}

/// Complete application configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Relational store configuration (required).
    pub database: DatabaseConfig,
    /// Authentication configuration (required).
    pub auth: AuthConfig,
    /// Screenshot storage configuration.
    #[serde(default)]
    pub s3: S3Config,
}

impl AppConfig {
    /// Validate configuration invariants that serde cannot express.
    pub fn validate(&self) -> Result<(), String> {
        self.database.kind()?;

        if self.auth.secret_key.trim().is_empty() {
            return Err("auth.secret_key must not be empty".to_string());
        }
        if !SUPPORTED_TOKEN_ALGORITHMS.contains(&self.auth.algorithm.as_str()) {
            return Err(format!(
                "auth.algorithm {} is not supported (expected one of {})",
                self.auth.algorithm,
                SUPPORTED_TOKEN_ALGORITHMS.join(", ")
            ));
        }
        if self.auth.access_token_expire_minutes == 0 {
            return Err("auth.access_token_expire_minutes must be at least 1".to_string());
        }
        if self.auth.access_token_expire_minutes > MAX_ACCESS_TOKEN_EXPIRE_MINUTES {
            return Err(format!(
                "auth.access_token_expire_minutes must be at most {MAX_ACCESS_TOKEN_EXPIRE_MINUTES}"
            ));
        }

        Ok(())
    }

    /// Create a test configuration with sensible defaults.
    ///
    /// **For testing only.** Uses an in-memory SQLite URL and a fixed secret.
    pub fn for_testing() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: default_max_connections(),
            },
            auth: AuthConfig {
                secret_key: "test-secret-key".to_string(),
                algorithm: default_algorithm(),
                access_token_expire_minutes: default_access_token_expire_minutes(),
                allow_admin_registration: true,
            },
            s3: S3Config::default(),
        }
    }
}
