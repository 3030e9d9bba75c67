use crate::domain::jobs::Invocation;
use async_trait::async_trait;
use std::io;

/// How the external downloader exited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stderr: String,
}

impl DownloadOutcome {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            exit_code: Some(0),
            stderr: String::new(),
        }
    }

    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            exit_code: Some(exit_code),
            stderr: stderr.into(),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Run the downloader to completion. Implementations must terminate the
    /// child process if the returned future is dropped.
    async fn download(&self, invocation: &Invocation) -> io::Result<DownloadOutcome>;
}
