//! Core domain types and shared logic for ClientPulse.
//!
//! This crate defines the pieces every other crate builds on:
//! - Application configuration
//! - Submission and registration validation
//! - Password hashing (Argon2id)
//! - Signed access tokens
//! - Analytics report shaping

pub mod admin;
pub mod analytics;
pub mod config;
pub mod error;
pub mod feedback;
pub mod password;
pub mod token;
pub mod validate;

pub use admin::{AdminCredentials, AdminRegistration};
pub use analytics::{AnalyticsReport, RatingStats};
pub use error::{Error, Result};
pub use feedback::{FeedbackSubmission, MAX_RATING, MIN_RATING};
pub use token::{TokenClaims, TokenError, TokenService};
