//! HTTP inbound adapter.
//!
//! JSON API in front of the job runner: `/health`, `/download` and
//! `/file-info/:job_id`.

mod error;
mod routes;

pub use routes::router;
