//! Tubegrab - HTTP front-end for an external video downloader
//!
//! Hexagonal Architecture:
//! - domain/: Job model and error classification
//! - ports/: Trait definitions (the downloader contract)
//! - adapters/: Concrete implementations (yt-dlp process, HTTP API)
//! - application/: The job runner
//! - config: Environment configuration

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports for convenience
pub use adapters::local::{http, YtDlp};
pub use application::job_runner::{JobRunner, RunnerSettings};
pub use config::ServiceConfig;
pub use domain::error::JobError;
pub use domain::jobs::{JobId, JobResult, Quality};
