//! Object storage abstraction and backends for ClientPulse.
//!
//! This crate provides:
//! - The [`ObjectStore`] backend trait
//! - An S3-compatible backend
//! - [`ScreenshotStore`], the best-effort adapter used for feedback screenshots

pub mod backends;
pub mod error;
pub mod screenshots;
pub mod traits;

pub use backends::s3::S3Backend;
pub use error::{StorageError, StorageResult};
pub use screenshots::{ScreenshotStore, public_url_base};
pub use traits::ObjectStore;
