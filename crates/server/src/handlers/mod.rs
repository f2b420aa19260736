//! HTTP request handlers.

pub mod admin;
pub mod analytics;
pub mod feedback;
pub mod service;

pub use admin::*;
pub use analytics::*;
pub use feedback::*;
pub use service::*;
