//! Domain layer - Job model and failure classification.

pub mod error;
pub mod jobs;
