//! Local adapters for single-server deployment.

pub mod http;
pub mod ytdlp;

pub use ytdlp::YtDlp;
