//! HTTP API server for ClientPulse.
//!
//! This crate provides the HTTP surface:
//! - Public feedback submission with optional screenshots
//! - Administrator registration, login and profile
//! - Analytics report, paged listing and export
//! - Service banner and health check

pub mod auth;
pub mod client_ip;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod trace;

pub use auth::CurrentAdmin;
pub use client_ip::ClientIp;
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
pub use trace::resolve_trace_id;
