//! Repository traits for metadata operations.

pub mod admins;
pub mod feedbacks;

pub use admins::AdminRepo;
pub use feedbacks::FeedbackRepo;
