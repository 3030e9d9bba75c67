//! Application layer - Generic services that use ports.

pub mod job_runner;
